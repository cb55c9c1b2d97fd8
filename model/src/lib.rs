/*!

This library provides the typed configuration for a network + EKS cluster stack and renders it into
the Terraform JSON configuration that the `terraform` CLI consumes.

The composition is acyclic by construction: the [`NetworkModule`] is declared first, the
[`ClusterModule`] can only be wired from the [`NetworkRefs`] that a declared network hands out, and
the root publishes the cluster endpoint as its only output.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use cluster::{ClusterConfig, ClusterInputs, ClusterModule};
pub use composition::{Composition, DefaultTags, RenderedConfiguration};
pub use configuration::Configuration;
pub use environment::Environment;
pub use error::{Error, Result};
pub use expression::TfValue;
pub use network::{NetworkConfig, NetworkModule, NetworkOutputs, NetworkRefs, Subnet, Vpc};
pub use node_group::{CapacityType, NodeGroupSpec, NodeGroups};
pub use resource_address::ResourceAddress;
pub use stack_file::StackFile;
pub use state::StateSnapshot;

pub mod cluster;
pub mod composition;
mod configuration;
pub mod constants;
pub mod environment;
mod error;
mod expression;
pub mod network;
pub mod node_group;
mod resource_address;
mod stack_file;
pub mod state;
