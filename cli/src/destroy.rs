use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use provisioner::clients::MemoryInfoClient;
use provisioner::{Destroy, NetworkClusterDestroyer};
use stack_utils::command::ProcessRunner;

/// Tear down the network and the cluster with `terraform destroy -auto-approve`, then check that no
/// managed resource is left in the state.
#[derive(Debug, Parser)]
pub(crate) struct DestroyNetworkCluster {}

impl DestroyNetworkCluster {
    pub(crate) async fn run(self, stack: Stack) -> Result<()> {
        let spec = stack.network_cluster_spec()?;
        let app_name = spec.configuration.app_name.clone();
        NetworkClusterDestroyer::new(ProcessRunner)
            .destroy(spec, None, &MemoryInfoClient::new())
            .await
            .context(format!(
                "Unable to destroy the network and cluster of '{}'",
                app_name
            ))?;

        println!("The network and cluster of '{}' were destroyed.", app_name);
        Ok(())
    }
}
