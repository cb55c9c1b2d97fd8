/*!

The environment of a run. Values come from the process environment, optionally seeded from a `.env`
file; the process environment wins. Empty values count as unset.

!*/

use crate::constants::{
    DEFAULT_REGION, DEFAULT_TAG, ENV_APP_NAME, ENV_AWS_ACCOUNT_ID, ENV_AWS_REGION, ENV_REGISTRY,
    ENV_REPOSITORY, ENV_TAG, TF_VAR_PREFIX,
};
use crate::error::{self, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub app_name: Option<String>,
    pub aws_account_id: Option<String>,
    pub aws_region: Option<String>,
    pub registry: Option<String>,
    pub repository: Option<String>,
    pub tag: Option<String>,
}

impl Environment {
    /// Reads `dotenv` if it is given and exists, then overlays the process environment.
    pub fn load(dotenv: Option<&Path>) -> Result<Self> {
        Self::load_with_vars(dotenv, process_vars())
    }

    /// Reads `dotenv` if it is given and exists, then overlays `vars`. Empty values in `vars` do
    /// not hide a value from the file.
    fn load_with_vars<I>(dotenv: Option<&Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = BTreeMap::new();
        if let Some(path) = dotenv.filter(|path| path.is_file()) {
            info!("Loading environment from '{}'", path.display());
            for item in dotenvy::from_path_iter(path).context(error::DotEnvSnafu { path })? {
                let (key, value) = item.context(error::DotEnvSnafu { path })?;
                merged.insert(key, value);
            }
        }
        merged.extend(
            vars.into_iter()
                .filter(|(_, value)| !value.trim().is_empty()),
        );
        Ok(Self::from_vars(merged))
    }

    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: BTreeMap<String, String> = vars
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();
        Self {
            app_name: vars.remove(ENV_APP_NAME),
            aws_account_id: vars.remove(ENV_AWS_ACCOUNT_ID),
            aws_region: vars.remove(ENV_AWS_REGION),
            registry: vars.remove(ENV_REGISTRY),
            repository: vars.remove(ENV_REPOSITORY),
            tag: vars.remove(ENV_TAG),
        }
    }

    pub fn app_name(&self) -> Result<&str> {
        required(&self.app_name, ENV_APP_NAME)
    }

    pub fn aws_account_id(&self) -> Result<&str> {
        required(&self.aws_account_id, ENV_AWS_ACCOUNT_ID)
    }

    /// `AWS_REGION`, or the default region when it is unset.
    pub fn region(&self) -> &str {
        self.aws_region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// `REGISTRY`, or the account's ECR registry when only `AWS_ACCOUNT_ID` is known.
    pub fn registry(&self) -> Result<String> {
        if let Some(registry) = &self.registry {
            return Ok(registry.clone());
        }
        let account = self
            .aws_account_id
            .as_deref()
            .context(error::MissingVariableSnafu { name: ENV_REGISTRY })?;
        let registry = format!("{}.dkr.ecr.{}.amazonaws.com", account, self.region());
        debug!("'{}' is unset, using '{}'", ENV_REGISTRY, registry);
        Ok(registry)
    }

    pub fn repository(&self) -> Result<&str> {
        required(&self.repository, ENV_REPOSITORY)
    }

    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or(DEFAULT_TAG)
    }

    /// The `TF_VAR_*` variables that feed the root composition's input variables.
    pub fn terraform_variables(&self) -> Result<BTreeMap<String, String>> {
        let mut vars = BTreeMap::new();
        vars.insert(
            format!("{}app_name", TF_VAR_PREFIX),
            self.app_name()?.to_string(),
        );
        vars.insert(format!("{}region", TF_VAR_PREFIX), self.region().to_string());
        Ok(vars)
    }
}

/// The process environment. Entries whose name or value is not valid UTF-8 are skipped.
fn process_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .context(error::MissingVariableSnafu { name })
}

#[cfg(test)]
mod test {
    use super::Environment;
    use maplit::btreemap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Environment {
        Environment::from_vars(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn terraform_variables() {
        let env = vars(&[("APP_NAME", "demo"), ("AWS_REGION", "eu-west-1")]);
        assert_eq!(
            env.terraform_variables().unwrap(),
            btreemap! {
                "TF_VAR_app_name".to_string() => "demo".to_string(),
                "TF_VAR_region".to_string() => "eu-west-1".to_string(),
            }
        );
    }

    #[test]
    fn missing_app_name_is_named() {
        let message = vars(&[]).terraform_variables().unwrap_err().to_string();
        assert!(message.contains("'APP_NAME'"));
    }

    #[test]
    fn empty_counts_as_unset() {
        let env = vars(&[("APP_NAME", ""), ("TAG", " ")]);
        assert!(env.app_name().is_err());
        assert_eq!(env.tag(), "latest");
        assert_eq!(env.region(), "us-west-2");
    }

    #[test]
    fn registry_falls_back_to_ecr() {
        let env = vars(&[("AWS_ACCOUNT_ID", "123456789012"), ("AWS_REGION", "us-east-2")]);
        assert_eq!(
            env.registry().unwrap(),
            "123456789012.dkr.ecr.us-east-2.amazonaws.com"
        );
        let env = vars(&[("REGISTRY", "ghcr.io/acme")]);
        assert_eq!(env.registry().unwrap(), "ghcr.io/acme");
        assert!(vars(&[]).registry().is_err());
    }

    fn overlay(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn dotenv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "REPOSITORY=model-api-from-dotenv-file").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "TAG=\"v1\"").unwrap();
        let env = Environment::load_with_vars(Some(file.path()), overlay(&[])).unwrap();
        assert_eq!(env.repository().unwrap(), "model-api-from-dotenv-file");
        assert_eq!(env.tag(), "v1");
    }

    #[test]
    fn process_environment_wins_over_dotenv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "APP_NAME=from-file").unwrap();
        writeln!(file, "TAG=v1").unwrap();
        writeln!(file, "AWS_REGION=eu-west-1").unwrap();
        let env = Environment::load_with_vars(
            Some(file.path()),
            overlay(&[("APP_NAME", "from-process"), ("TAG", ""), ("AWS_REGION", " ")]),
        )
        .unwrap();
        assert_eq!(env.app_name().unwrap(), "from-process");
        // Empty process values leave the file's value in place.
        assert_eq!(env.tag(), "v1");
        assert_eq!(env.region(), "eu-west-1");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_process_variable_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = "STACK_MODEL_TEST_NON_UTF8";
        std::env::set_var(name, OsStr::from_bytes(b"f\xffo"));
        let result = Environment::load(None);
        std::env::remove_var(name);
        result.unwrap();
    }

    #[test]
    fn missing_dotenv_is_ignored() {
        Environment::load(Some(std::path::Path::new("/nonexistent/.env"))).unwrap();
    }
}
