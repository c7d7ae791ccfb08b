use assert_cmd::prelude::*;
use command_extra::CommandExtra;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tempfile::{tempdir, TempDir};

/// A `tapster` command whose current directory is a fresh temporary workspace.
pub struct CommandTempCwd {
    pub tapster: Command,
    pub root: TempDir,
    pub workspace: PathBuf,
}

impl CommandTempCwd {
    /// Create a temporary workspace without a `.tapsterrc`.
    pub fn init() -> Self {
        let root = tempdir().expect("create temporary directory");
        let workspace = root.path().join("workspace");
        fs::create_dir(&workspace).expect("create temporary workspace for tapster");
        let tapster = Command::cargo_bin("tapster")
            .expect("find the tapster binary")
            .with_current_dir(&workspace)
            .with_env("HOME", root.path());
        CommandTempCwd { tapster, root, workspace }
    }

    /// Write `content` to `.tapsterrc` in the workspace.
    pub fn add_config(self, content: &str) -> Self {
        write_config(&self.workspace, content);
        self
    }
}

fn write_config(workspace: &Path, content: &str) {
    fs::write(workspace.join(".tapsterrc"), content).expect("write to .tapsterrc");
}
