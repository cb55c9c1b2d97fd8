use snafu::Snafu;

/// The result type returned by [`InfoClient`] implementations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// The error type returned by [`InfoClient`] implementations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("Unable to read the stored info: {}", source))]
    Deserialization { source: stack_model::Error },

    #[snafu(display("Unable to store info: {}", source))]
    Serialization { source: stack_model::Error },
}
