use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use provisioner::image::DEFAULT_PLATFORM;
use provisioner::{ImageConfig, ImagePublisher};
use stack_utils::command::ProcessRunner;
use std::path::PathBuf;

/// Log in to the registry, then build, tag and push an image. `REPOSITORY` names the image, `TAG`
/// (default `latest`) its tag and `REGISTRY` (or `AWS_ACCOUNT_ID` with `AWS_REGION`) the registry.
#[derive(Debug, Parser)]
pub(crate) struct PushImage {
    /// The docker build context.
    #[clap(default_value = ".")]
    context: PathBuf,

    /// The Dockerfile, if it is not `Dockerfile` in the build context.
    #[clap(long = "file", short = 'f')]
    dockerfile: Option<PathBuf>,

    /// The platform the image is built for.
    #[clap(long = "platform", default_value = DEFAULT_PLATFORM)]
    platform: String,
}

impl PushImage {
    pub(crate) fn run(self, stack: Stack) -> Result<()> {
        let config = ImageConfig {
            platform: self.platform,
            dockerfile: self.dockerfile,
            ..ImageConfig::from_environment(stack.environment(), self.context)
                .context("Unable to determine the image to publish")?
        };
        let published = ImagePublisher::new(ProcessRunner)
            .publish(&config)
            .context(format!("Unable to publish '{}'", config.remote_reference()))?;

        println!("{}", published.uri);
        Ok(())
    }
}
