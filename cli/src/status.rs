use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use provisioner::terraform::Terraform;
use stack_model::constants::NETWORK_MODULE;
use stack_utils::command::ProcessRunner;

/// Summarize the managed resources in the state with `terraform show -json`.
#[derive(Debug, Parser)]
pub(crate) struct Status {
    /// List every managed resource address.
    #[clap(long = "resources", short = 'r')]
    resources: bool,
}

impl Status {
    pub(crate) fn run(self, stack: Stack) -> Result<()> {
        let terraform = Terraform::new(
            &ProcessRunner,
            stack.working_dir(),
            stack.terraform_variables()?,
        );
        let state = terraform.show().context("Unable to read the state")?;
        let managed = state.managed_resources();

        println!("managed_resources = {}", managed.len());
        if let Ok(endpoint) = state.cluster_endpoint() {
            println!("cluster_endpoint = {}", endpoint);
        }
        if let Some(network) = state.network_outputs(NETWORK_MODULE) {
            println!("vpc = {}", network.vpc.id);
            println!("public_subnets = {}", network.public_subnet_ids().join(", "));
            println!("private_subnets = {}", network.private_subnet_ids().join(", "));
        }
        if self.resources {
            for resource in managed {
                println!("{}", resource.address);
            }
        }
        Ok(())
    }
}
