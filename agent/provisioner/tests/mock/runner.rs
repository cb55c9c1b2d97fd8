use stack_utils::command::{CommandOutput, CommandRunner, CommandSpec};
use stack_utils::Error;
use std::sync::Mutex;

/// A [`CommandRunner`] that records every invocation instead of starting a process. Commands whose
/// display form starts with a registered prefix get the registered output; everything else
/// succeeds with empty output.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    responses: Vec<(String, CommandOutput)>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.responses.push((prefix.to_string(), output));
        self
    }

    pub(crate) fn respond_stdout(self, prefix: &str, stdout: &str) -> Self {
        self.respond(
            prefix,
            CommandOutput {
                stdout: stdout.as_bytes().to_vec(),
                ..CommandOutput::success()
            },
        )
    }

    pub(crate) fn fail(self, prefix: &str) -> Self {
        self.respond(
            prefix,
            CommandOutput {
                code: Some(1),
                stdout: Vec::new(),
                stderr: b"mock failure".to_vec(),
            },
        )
    }

    pub(crate) fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// The display form of every recorded command, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.specs().iter().map(|spec| spec.to_string()).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, Error> {
        self.calls.lock().unwrap().push(command.clone());
        let display = command.to_string();
        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| display.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(CommandOutput::success))
    }
}
