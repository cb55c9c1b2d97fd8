use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use provisioner::terraform::Terraform;
use serde_json::Value;
use stack_model::constants::CLUSTER_ENDPOINT_OUTPUT;
use stack_utils::command::ProcessRunner;

/// Print a root output of the applied configuration with `terraform output -json`.
#[derive(Debug, Parser)]
pub(crate) struct Output {
    /// The output to print.
    #[clap(default_value = CLUSTER_ENDPOINT_OUTPUT)]
    name: String,
}

impl Output {
    pub(crate) fn run(self, stack: Stack) -> Result<()> {
        let terraform = Terraform::new(
            &ProcessRunner,
            stack.working_dir(),
            stack.terraform_variables()?,
        );
        let value = terraform
            .output(&self.name)
            .context(format!("Unable to read output '{}'", self.name))?;
        match value {
            Value::String(s) => println!("{}", s),
            other => println!(
                "{}",
                serde_json::to_string_pretty(&other)
                    .context("Could not create string from output.")?
            ),
        }
        Ok(())
    }
}
