use snafu::Snafu;

/// Errors from driving the external tools directly, outside of a [`Create`] or [`Destroy`] run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to {}: {}", step, source))]
    Image {
        step: String,
        source: stack_utils::Error,
    },

    #[snafu(display("The registry returned an empty login password"))]
    EmptyPassword,

    #[snafu(display("Unable to update the kubeconfig for cluster '{}': {}", cluster, source))]
    Kubeconfig {
        cluster: String,
        source: stack_utils::Error,
    },

    #[snafu(display("Unable to read output '{}': {}", name, source))]
    OutputParse {
        name: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to read the provisioning state: {}", source))]
    State { source: stack_model::Error },

    #[snafu(display("'terraform {}' failed: {}", step, source))]
    Terraform {
        step: String,
        source: stack_utils::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
