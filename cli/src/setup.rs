use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use provisioner::clients::MemoryInfoClient;
use provisioner::{Create, NetworkClusterCreator};
use stack_utils::command::ProcessRunner;

/// Provision the network and the cluster. The configuration is rendered into the working directory
/// and applied with `terraform init` followed by `terraform apply -auto-approve`.
#[derive(Debug, Parser)]
pub(crate) struct SetupNetworkCluster {
    /// Output the created stack in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl SetupNetworkCluster {
    pub(crate) async fn run(self, stack: Stack) -> Result<()> {
        let spec = stack.network_cluster_spec()?;
        let client = MemoryInfoClient::new();
        let created = NetworkClusterCreator::new(ProcessRunner)
            .create(spec, &client)
            .await
            .map_err(|e| {
                if e.resources().needs_destroy() {
                    warn!("Run `stackctl destroy-network-cluster` to remove what was created");
                }
                e
            })
            .context("Unable to set up the network and cluster")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&created)
                    .context("Could not create string from the created stack.")?
            );
        } else {
            println!("cluster_endpoint = {}", created.cluster_endpoint);
            if let Some(network) = &created.network {
                println!("vpc = {}", network.vpc.id);
                println!("public_subnets = {}", network.public_subnet_ids().join(", "));
                println!("private_subnets = {}", network.private_subnet_ids().join(", "));
            }
        }
        Ok(())
    }
}
