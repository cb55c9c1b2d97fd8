use anyhow::{Context, Result};
use log::debug;
use provisioner::{NetworkClusterConfig, Spec};
use stack_model::{Composition, Environment, StackFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything a subcommand needs to know about the stack it operates on: the environment, the
/// (possibly defaulted) stack file and the working directory.
#[derive(Debug, Clone)]
pub(crate) struct Stack {
    environment: Environment,
    stack_file: StackFile,
    working_dir: PathBuf,
}

impl Stack {
    pub(crate) fn load(
        env_file: &Path,
        config: Option<&Path>,
        working_dir: PathBuf,
    ) -> Result<Self> {
        let environment = Environment::load(Some(env_file))
            .context(format!("Unable to load environment from '{}'", env_file.display()))?;
        let stack_file = match config {
            Some(path) => StackFile::from_path(path)
                .context(format!("Unable to read stack file '{}'", path.display()))?,
            None => StackFile::default(),
        };
        debug!("Loaded environment {:?}", environment);
        Ok(Self {
            environment,
            stack_file,
            working_dir,
        })
    }

    pub(crate) fn environment(&self) -> &Environment {
        &self.environment
    }

    pub(crate) fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub(crate) fn app_name(&self) -> Result<&str> {
        Ok(self.environment.app_name()?)
    }

    pub(crate) fn region(&self) -> &str {
        self.environment.region()
    }

    pub(crate) fn composition(&self) -> Result<Composition> {
        Ok(Composition::new(
            self.app_name()?,
            self.region(),
            self.stack_file.clone(),
        ))
    }

    /// The `TF_VAR_*` variables every `terraform` invocation gets.
    pub(crate) fn terraform_variables(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.environment.terraform_variables()?)
    }

    pub(crate) fn network_cluster_spec(&self) -> Result<Spec<NetworkClusterConfig>> {
        Ok(Spec {
            configuration: NetworkClusterConfig {
                app_name: self.app_name()?.to_string(),
                region: self.region().to_string(),
                working_dir: self.working_dir.clone(),
                stack: self.stack_file.clone(),
            },
            variables: self.terraform_variables()?,
        })
    }
}
