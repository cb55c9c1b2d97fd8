use crate::stack::Stack;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Validate the stack and render its Terraform configuration. Nothing is provisioned.
#[derive(Debug, Parser)]
pub(crate) struct Render {
    /// Render into this directory instead of the working directory.
    #[clap(long = "dir", conflicts_with = "stdout")]
    dir: Option<PathBuf>,

    /// Print the rendered files as one JSON object keyed by path instead of writing them.
    #[clap(long = "stdout")]
    stdout: bool,
}

impl Render {
    pub(crate) fn run(self, stack: Stack) -> Result<()> {
        let rendered = stack
            .composition()?
            .render()
            .context("Invalid stack configuration")?;

        if self.stdout {
            let files: serde_json::Map<String, serde_json::Value> = rendered
                .files()
                .iter()
                .map(|(path, value)| (path.display().to_string(), value.clone()))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&files)
                    .context("Could not create string from the rendered configuration.")?
            );
            return Ok(());
        }

        let dir = self
            .dir
            .unwrap_or_else(|| stack.working_dir().to_path_buf());
        rendered
            .write_to(&dir)
            .context(format!("Unable to write configuration to '{}'", dir.display()))?;
        info!("Rendered {} files", rendered.files().len());
        println!("{}", dir.display());
        Ok(())
    }
}
