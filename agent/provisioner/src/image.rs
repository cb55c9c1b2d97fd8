/*!

Builds a platform-pinned container image and pushes it to an ECR registry. The steps run in order
and the first failure stops the run: a failed login never proceeds to build or push.

!*/

use crate::error::{self, Result};
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use stack_model::Environment;
use stack_utils::command::{CommandRunner, CommandSpec};
use stack_utils::impl_display_as_json;
use std::path::PathBuf;

pub const DEFAULT_PLATFORM: &str = "linux/amd64";
const REGISTRY_USERNAME: &str = "AWS";

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// e.g. `123456789012.dkr.ecr.us-west-2.amazonaws.com`
    pub registry: String,
    pub repository: String,
    pub tag: String,
    /// The region of the registry, used to obtain the login password.
    pub region: String,
    pub platform: String,
    /// The docker build context.
    pub context: PathBuf,
    pub dockerfile: Option<PathBuf>,
}

impl_display_as_json!(ImageConfig);

impl ImageConfig {
    /// Takes registry, repository, tag and region from the environment.
    pub fn from_environment(
        environment: &Environment,
        context: PathBuf,
    ) -> stack_model::Result<Self> {
        Ok(Self {
            registry: environment.registry()?,
            repository: environment.repository()?.to_string(),
            tag: environment.tag().to_string(),
            region: environment.region().to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            context,
            dockerfile: None,
        })
    }

    /// `<repository>:<tag>`
    pub fn local_reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// `<registry>/<repository>:<tag>`
    pub fn remote_reference(&self) -> String {
        format!(
            "{}/{}",
            self.registry.trim_end_matches('/'),
            self.local_reference()
        )
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedImage {
    pub uri: String,
}

impl_display_as_json!(PublishedImage);

pub struct ImagePublisher<R>
where
    R: CommandRunner,
{
    runner: R,
}

impl<R> ImagePublisher<R>
where
    R: CommandRunner,
{
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Login, build, tag, push.
    pub fn publish(&self, config: &ImageConfig) -> Result<PublishedImage> {
        info!("Publishing '{}'", config.remote_reference());
        self.login(config)?;
        self.build(config)?;
        self.tag(config)?;
        self.push(config)?;
        Ok(PublishedImage {
            uri: config.remote_reference(),
        })
    }

    fn login(&self, config: &ImageConfig) -> Result<()> {
        let password = self
            .runner
            .run_checked(
                &CommandSpec::new("aws")
                    .args(["ecr", "get-login-password", "--region"])
                    .arg(&config.region)
                    .capture(),
            )
            .context(error::ImageSnafu {
                step: "get the registry login password",
            })?
            .stdout_string();
        let password = password.trim();
        ensure!(!password.is_empty(), error::EmptyPasswordSnafu);

        self.runner
            .run_checked(
                &CommandSpec::new("docker")
                    .args(["login", "--username", REGISTRY_USERNAME, "--password-stdin"])
                    .arg(&config.registry)
                    .stdin(password)
                    .capture(),
            )
            .context(error::ImageSnafu {
                step: "log in to the registry",
            })?;
        Ok(())
    }

    fn build(&self, config: &ImageConfig) -> Result<()> {
        let mut command = CommandSpec::new("docker")
            .args(["build", "--platform"])
            .arg(&config.platform)
            .arg("-t")
            .arg(config.local_reference());
        if let Some(dockerfile) = &config.dockerfile {
            command = command.arg("-f").arg(dockerfile.display().to_string());
        }
        let command = command.arg(config.context.display().to_string());
        self.runner
            .run_checked(&command)
            .context(error::ImageSnafu {
                step: "build the image",
            })?;
        Ok(())
    }

    fn tag(&self, config: &ImageConfig) -> Result<()> {
        self.runner
            .run_checked(
                &CommandSpec::new("docker")
                    .arg("tag")
                    .arg(config.local_reference())
                    .arg(config.remote_reference()),
            )
            .context(error::ImageSnafu {
                step: "tag the image",
            })?;
        Ok(())
    }

    fn push(&self, config: &ImageConfig) -> Result<()> {
        self.runner
            .run_checked(
                &CommandSpec::new("docker")
                    .arg("push")
                    .arg(config.remote_reference()),
            )
            .context(error::ImageSnafu {
                step: "push the image",
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ImageConfig;
    use stack_model::Environment;
    use std::path::PathBuf;

    #[test]
    fn references() {
        let config = ImageConfig {
            registry: "123456789012.dkr.ecr.us-west-2.amazonaws.com/".into(),
            repository: "model-api".into(),
            tag: "v3".into(),
            ..ImageConfig::default()
        };
        assert_eq!(config.local_reference(), "model-api:v3");
        assert_eq!(
            config.remote_reference(),
            "123456789012.dkr.ecr.us-west-2.amazonaws.com/model-api:v3"
        );
    }

    #[test]
    fn from_environment_requires_repository() {
        let environment = Environment {
            aws_account_id: Some("123456789012".into()),
            ..Environment::default()
        };
        assert!(ImageConfig::from_environment(&environment, PathBuf::from(".")).is_err());

        let environment = Environment {
            repository: Some("gateway".into()),
            ..environment
        };
        let config = ImageConfig::from_environment(&environment, PathBuf::from(".")).unwrap();
        assert_eq!(config.tag, "latest");
        assert_eq!(config.platform, "linux/amd64");
        assert_eq!(
            config.remote_reference(),
            "123456789012.dkr.ecr.us-west-2.amazonaws.com/gateway:latest"
        );
    }
}
