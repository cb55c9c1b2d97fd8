use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use provisioner::kubeconfig::update_kubeconfig;
use stack_utils::command::ProcessRunner;
use std::path::PathBuf;

/// Add the cluster, which is named after `APP_NAME`, to a kubeconfig.
#[derive(Debug, Parser)]
pub(crate) struct UpdateKubeconfig {
    /// The kubeconfig to update. Defaults to whatever `aws` uses, usually `~/.kube/config`.
    #[clap(long = "kubeconfig")]
    kubeconfig: Option<PathBuf>,
}

impl UpdateKubeconfig {
    pub(crate) fn run(self, stack: Stack) -> Result<()> {
        let cluster = stack.app_name()?;
        update_kubeconfig(
            &ProcessRunner,
            cluster,
            stack.region(),
            self.kubeconfig.as_deref(),
        )
        .context("Unable to update kubeconfig")?;
        Ok(())
    }
}
