/*!

This is the command line interface for provisioning a network + EKS cluster stack with `terraform`
and for publishing container images to the stack's ECR registry.

!*/

mod destroy;
mod output;
mod push_image;
mod render;
mod setup;
mod stack;
mod status;
mod update_kubeconfig;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use stack::Stack;
use stack_model::constants::{DEFAULT_ENV_FILE, DEFAULT_WORKING_DIR};
use stack_utils::init_logger;
use std::path::PathBuf;

/// Provision a network + EKS cluster stack and publish images to its registry.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// A dotenv file to seed the environment from. Variables already set in the process
    /// environment win. Ignored if the file does not exist.
    #[clap(long = "env-file", default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
    /// A YAML stack file overriding the default network, cluster and node group settings.
    #[clap(long = "config")]
    config: Option<PathBuf>,
    /// The directory the configuration is rendered to and `terraform` runs in.
    #[clap(long = "working-dir", default_value = DEFAULT_WORKING_DIR)]
    working_dir: PathBuf,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Provision the network and the cluster with `terraform apply`.
    SetupNetworkCluster(setup::SetupNetworkCluster),
    /// Tear the network and the cluster down with `terraform destroy`.
    DestroyNetworkCluster(destroy::DestroyNetworkCluster),
    /// Build the image for linux/amd64 and push it to the registry.
    PushImage(push_image::PushImage),
    /// Render the Terraform configuration without running anything.
    Render(render::Render),
    /// Print a root output, by default the cluster endpoint.
    Output(output::Output),
    /// Add the cluster to a kubeconfig.
    UpdateKubeconfig(update_kubeconfig::UpdateKubeconfig),
    /// Summarize the resources in the current state.
    Status(status::Status),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    if let Err(e) = run(args).await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let stack = Stack::load(&args.env_file, args.config.as_deref(), args.working_dir)?;
    match args.command {
        Command::SetupNetworkCluster(setup) => setup.run(stack).await,
        Command::DestroyNetworkCluster(destroy) => destroy.run(stack).await,
        Command::PushImage(push_image) => push_image.run(stack),
        Command::Render(render) => render.run(stack),
        Command::Output(output) => output.run(stack),
        Command::UpdateKubeconfig(update_kubeconfig) => update_kubeconfig.run(stack),
        Command::Status(status) => status.run(stack),
    }
}
