use crate::{Brew, LocalStateError};
use serde::de::DeserializeOwned;
use std::process::Stdio;
use tapster_registry::{DetailedItem, InstalledInstance};

impl Brew {
    /// Installed instances of `identifier` according to `brew info --json=v1`.
    ///
    /// An empty document means nothing is installed.
    pub async fn installed_instances(
        &self,
        identifier: &str,
    ) -> Result<Vec<InstalledInstance>, LocalStateError> {
        let items: Vec<DetailedItem> = self.info_json(&[identifier]).await?;
        let instances = items.into_iter().next().map(|item| item.installed).unwrap_or_default();
        tracing::debug!(
            target: "tapster::local_state",
            ?identifier,
            instances = instances.len(),
            "Read local state",
        );
        Ok(instances)
    }

    /// Every installed package according to `brew info --json=v1 --installed`.
    pub async fn installed_items(&self) -> Result<Vec<DetailedItem>, LocalStateError> {
        self.info_json(&["--installed"]).await
    }

    async fn info_json<Value>(&self, args: &[&str]) -> Result<Value, LocalStateError>
    where
        Value: DeserializeOwned,
    {
        let timeout = self.timeout();
        let mut command = self.command();
        command.arg("info").arg("--json=v1").args(args).stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| LocalStateError::Timeout { timeout })?
            .map_err(|error| LocalStateError::Spawn { error })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(LocalStateError::Exit { status: output.status, stderr });
        }

        serde_json::from_slice(&output.stdout).map_err(|error| LocalStateError::Decode { error })
    }
}
