/*!

The `provisioner` library drives the external tools that provision a network + EKS cluster stack.
Provisioning is expressed through the [`Create`] and [`Destroy`] traits, implemented for the stack by
[`NetworkClusterCreator`] and [`NetworkClusterDestroyer`]. Both run `terraform` against the
configuration rendered by `stack-model`; every program is started through a
[`CommandRunner`](stack_utils::command::CommandRunner) so that tests can inject a recording runner.

!*/

pub mod clients;
mod error;
pub mod image;
pub mod kubeconfig;
pub mod network_cluster;
pub mod provider;
pub mod terraform;

pub use error::{Error, Result};
pub use image::{ImageConfig, ImagePublisher, PublishedImage};
pub use network_cluster::{
    CreatedStack, NetworkClusterConfig, NetworkClusterCreator, NetworkClusterDestroyer,
    ProvisioningMemo,
};
pub use provider::{Create, Destroy, ProviderError, ProviderResult, Resources, Spec};
pub use stack_model::Configuration;
