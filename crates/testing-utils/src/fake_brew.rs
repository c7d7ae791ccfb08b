use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::{tempdir, TempDir};

/// Shell script standing in for the `brew` executable.
///
/// The script is meant to be run as `sh <script> <args>...`, so it never needs the
/// executable bit. Every invocation is appended to a log that can be read back with
/// [`FakeBrew::invocations`].
pub struct FakeBrew {
    root: TempDir,
    script: PathBuf,
}

impl FakeBrew {
    /// Program that runs the script.
    pub const PROGRAM: &'static str = "sh";

    /// Create a script whose body is `body`. The arguments are available as `$1`, `$2`, ...
    pub fn new(body: &str) -> Self {
        let root = tempdir().expect("create temporary directory");
        let script = root.path().join("brew.sh");
        let log = root.path().join("invocations.log");
        let content = format!("#!/bin/sh\necho \"$@\" >> '{}'\n{body}\n", log.display());
        fs::write(&script, content).expect("write fake brew script");
        FakeBrew { root, script }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Arguments of every invocation so far, one line per invocation.
    pub fn invocations(&self) -> Vec<String> {
        match fs::read_to_string(self.root.path().join("invocations.log")) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}
