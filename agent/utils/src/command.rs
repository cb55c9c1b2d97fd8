use crate::error::{self, Result};
use log::{info, trace};
use snafu::{ensure, ResultExt};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// What happens to the output streams of a command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// Streams go to the terminal, which suits long-running steps such as `terraform apply`.
    Inherit,
    /// Streams are captured into the returned [`CommandOutput`].
    Capture,
}

/// An external program invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: BTreeMap<String, String>,
    pub current_dir: Option<PathBuf>,
    /// Written to the program's stdin, which is then closed. Never logged.
    pub stdin: Option<Vec<u8>>,
    pub output: OutputMode,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: BTreeMap::new(),
            current_dir: None,
            stdin: None,
            output: OutputMode::Inherit,
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(envs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn stdin<B: Into<Vec<u8>>>(mut self, input: B) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn capture(mut self) -> Self {
        self.output = OutputMode::Capture;
        self
    }
}

impl Display for CommandSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    /// `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Returns `self` if the command exited with zero, otherwise an error carrying the exit code
    /// and whatever was captured.
    pub fn check(self, command: &CommandSpec) -> Result<Self> {
        ensure!(
            self.is_success(),
            error::CommandFailedSnafu {
                command: command.to_string(),
                code: self.code.unwrap_or(-1),
                stderr: String::from_utf8_lossy(&self.stderr),
                stdout: String::from_utf8_lossy(&self.stdout),
            }
        );
        Ok(self)
    }
}

/// Runs external programs. Implemented as a trait so that test doubles can record invocations
/// instead of executing them; in practice you will use [`ProcessRunner`].
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion. A non-zero exit is not an error at this level; use
    /// [`CommandOutput::check`] for that.
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Runs the command and fails unless it exits with zero.
    fn run_checked(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.run(command)?.check(command)
    }
}

impl<T> CommandRunner for &T
where
    T: CommandRunner,
{
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        (**self).run(command)
    }
}

/// Provides the default [`CommandRunner`] implementation using `std::process`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let display = spec.to_string();
        info!("Running '{}'", display);
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).envs(&spec.envs);
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }
        if spec.stdin.is_some() {
            command.stdin(Stdio::piped());
        }
        if spec.output == OutputMode::Capture {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = command.spawn().context(error::SpawnSnafu {
            command: display.as_str(),
        })?;
        if let (Some(input), Some(mut stdin)) = (&spec.stdin, child.stdin.take()) {
            if let Err(e) = stdin.write_all(input) {
                // Reap the child so a failed write does not leave a zombie behind.
                let _ = child.kill();
                let _ = child.wait();
                return Err(e).context(error::StdinSnafu {
                    command: display.as_str(),
                });
            }
        }
        let output = child.wait_with_output().context(error::WaitSnafu {
            command: display.as_str(),
        })?;
        trace!("'{}' exited with {}", display, output.status);
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};

    #[test]
    fn display_quotes_whitespace() {
        let spec = CommandSpec::new("docker")
            .args(["build", "-t", "app:latest"])
            .arg("my dir");
        assert_eq!(spec.to_string(), "docker build -t app:latest 'my dir'");
    }

    #[test]
    fn check_reports_exit_code() {
        let spec = CommandSpec::new("terraform").arg("apply");
        let output = CommandOutput {
            code: Some(1),
            stdout: b"partial".to_vec(),
            stderr: b"Error: boom".to_vec(),
        };
        let message = output.check(&spec).unwrap_err().to_string();
        assert!(message.contains("'terraform apply', exit code 1"));
        assert!(message.contains("Error: boom"));
        assert!(CommandOutput::success().check(&spec).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_pipes_stdin() {
        let spec = CommandSpec::new("cat").stdin("secret").capture();
        let output = ProcessRunner.run_checked(&spec).unwrap();
        assert_eq!(output.stdout_string(), "secret");
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_non_zero() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]).capture();
        let output = ProcessRunner.run(&spec).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(ProcessRunner.run_checked(&spec).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn stdin_write_failure_is_an_error() {
        // The program exits without reading, so a large write hits a closed pipe.
        let spec = CommandSpec::new("true")
            .stdin(vec![b'x'; 4 * 1024 * 1024])
            .capture();
        let error = ProcessRunner.run(&spec).unwrap_err();
        assert!(error.to_string().contains("Unable to write to the stdin of 'true'"));
    }

    #[test]
    fn missing_program() {
        let spec = CommandSpec::new("definitely-not-a-real-program-name").capture();
        assert!(ProcessRunner.run(&spec).is_err());
    }
}
