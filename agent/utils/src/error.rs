use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display(
        "Error running '{}', exit code {}\nstderr:\n{}\nstdout:\n{}",
        command,
        code,
        stderr,
        stdout
    ))]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
        stdout: String,
    },

    #[snafu(display("Unable to start '{}': {}", command, source))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("Unable to write to the stdin of '{}': {}", command, source))]
    Stdin {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("Failed waiting for '{}' to finish: {}", command, source))]
    Wait {
        command: String,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
