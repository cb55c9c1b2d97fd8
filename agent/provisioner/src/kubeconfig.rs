use crate::error::{self, Result};
use snafu::ResultExt;
use stack_utils::command::{CommandRunner, CommandSpec};
use std::path::Path;

/// Adds (or refreshes) the cluster's context in a kubeconfig with `aws eks update-kubeconfig`. The
/// cluster is named after the application.
pub fn update_kubeconfig<R>(
    runner: &R,
    cluster: &str,
    region: &str,
    kubeconfig: Option<&Path>,
) -> Result<()>
where
    R: CommandRunner,
{
    let mut command = CommandSpec::new("aws")
        .args(["eks", "update-kubeconfig", "--name", cluster, "--region", region]);
    if let Some(path) = kubeconfig {
        command = command.arg("--kubeconfig").arg(path.display().to_string());
    }
    runner
        .run_checked(&command)
        .context(error::KubeconfigSnafu { cluster })?;
    Ok(())
}
