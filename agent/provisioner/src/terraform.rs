use crate::error::{self, Result};
use log::debug;
use serde_json::Value;
use snafu::ResultExt;
use stack_model::StateSnapshot;
use stack_utils::command::{CommandOutput, CommandRunner, CommandSpec};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const TERRAFORM: &str = "terraform";

/// Runs `terraform` subcommands in a working directory that holds a rendered configuration. Every
/// subcommand is non-interactive; `apply` and `destroy` are auto-approved.
pub struct Terraform<'a, R>
where
    R: CommandRunner,
{
    runner: &'a R,
    working_dir: PathBuf,
    variables: BTreeMap<String, String>,
}

impl<'a, R> Terraform<'a, R>
where
    R: CommandRunner,
{
    pub fn new<P: AsRef<Path>>(
        runner: &'a R,
        working_dir: P,
        variables: BTreeMap<String, String>,
    ) -> Self {
        Self {
            runner,
            working_dir: working_dir.as_ref().to_path_buf(),
            variables,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn init(&self) -> Result<()> {
        self.run("init", &["init", "-input=false"], false)?;
        Ok(())
    }

    pub fn apply(&self) -> Result<()> {
        self.run("apply", &["apply", "-auto-approve", "-input=false"], false)?;
        Ok(())
    }

    pub fn destroy(&self) -> Result<()> {
        self.run("destroy", &["destroy", "-auto-approve", "-input=false"], false)?;
        Ok(())
    }

    /// The current state as printed by `terraform show -json`.
    pub fn show(&self) -> Result<StateSnapshot> {
        let output = self.run("show", &["show", "-json"], true)?;
        StateSnapshot::from_json(&output.stdout_string()).context(error::StateSnafu)
    }

    /// A single root output, decoded from `terraform output -json <name>`.
    pub fn output(&self, name: &str) -> Result<Value> {
        let output = self.run("output", &["output", "-json", name], true)?;
        serde_json::from_slice(&output.stdout).context(error::OutputParseSnafu { name })
    }

    fn command(&self, args: &[&str]) -> CommandSpec {
        CommandSpec::new(TERRAFORM)
            .args(args.iter().copied())
            .current_dir(&self.working_dir)
            .envs(self.variables.clone())
            .envs([("TF_IN_AUTOMATION", "1")])
    }

    fn run(&self, step: &str, args: &[&str], capture: bool) -> Result<CommandOutput> {
        let mut command = self.command(args);
        if capture {
            command = command.capture();
        }
        debug!(
            "Running '{}' in '{}'",
            command,
            self.working_dir.display()
        );
        self.runner
            .run_checked(&command)
            .context(error::TerraformSnafu { step })
    }
}
