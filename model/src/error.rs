use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Error deserializing configuration: {}", source))]
    ConfigDeserialization { source: serde_json::Error },

    #[snafu(display("Error serializing configuration: {}", source))]
    ConfigSerialization { source: serde_json::Error },

    #[snafu(display(
        "Error serializing configuration: expected Value::Object type but got something else."
    ))]
    ConfigWrongValueType {},

    #[snafu(display("Unable to create directory '{}': {}", path.display(), source))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to read environment file '{}': {}", path.display(), source))]
    DotEnv {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[snafu(display("'{}' is not a valid IPv4 CIDR block", cidr))]
    InvalidCidr { cidr: String },

    #[snafu(display("Invalid network configuration: {}", reason))]
    InvalidNetwork { reason: String },

    #[snafu(display("Invalid node group '{}': {}", name, reason))]
    InvalidNodeGroup { name: String, reason: String },

    #[snafu(display("The environment variable '{}' is required but was not set", name))]
    MissingVariable { name: String },

    #[snafu(display("Output '{}' was missing from the provisioning state", name))]
    OutputMissing { name: String },

    #[snafu(display("Output '{}' was not a string", name))]
    OutputType { name: String },

    #[snafu(display("Unable to read stack file '{}': {}", path.display(), source))]
    StackFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse stack file '{}': {}", path.display(), source))]
    StackFileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("Unable to parse provisioning state: {}", source))]
    StateParse { source: serde_json::Error },

    #[snafu(display("Unable to serialize '{}': {}", what, source))]
    Serialize {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("Failed to write file at '{}': {}", path.display(), source))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
