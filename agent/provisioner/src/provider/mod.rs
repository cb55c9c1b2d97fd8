mod error;

pub use self::error::{AsResources, IntoProviderError, ProviderError, ProviderResult, Resources};
use crate::clients::InfoClient;
use serde::Serialize;
use stack_model::Configuration;
use std::collections::BTreeMap;

/// Everything a provider is handed for one run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Spec<C>
where
    C: Configuration,
{
    pub configuration: C,

    /// Environment variables passed to every external program the provider runs, e.g. the
    /// `TF_VAR_*` inputs of the root composition.
    pub variables: BTreeMap<String, String>,
}

/// You implement the [`Create`] trait in order to provision resources.
///
/// ## Custom Types
///
/// - `Config` is the information needed to provision, e.g. the stack description and the working
///   directory the configuration is rendered into.
///
/// - `Info` is the progress memo the provider keeps through an [`InfoClient`] while it runs. If a
///   step fails, the memo tells the caller how far it got.
///
/// - `Resource` describes what was provisioned.
///
#[async_trait::async_trait]
pub trait Create: Sized + Send + Sync {
    type Config: Configuration;
    type Info: Configuration;
    type Resource: Configuration;

    async fn create<I>(
        &self,
        spec: Spec<Self::Config>,
        client: &I,
    ) -> ProviderResult<Self::Resource>
    where
        I: InfoClient;
}

/// You implement the [`Destroy`] trait in order to tear down resources that a [`Create`] run
/// provisioned. `resource` is `None` when the caller has no record of the creation, in which case
/// the provider has to work from `spec` alone.
#[async_trait::async_trait]
pub trait Destroy: Sized + Send + Sync {
    type Config: Configuration;
    type Info: Configuration;
    type Resource: Configuration;

    async fn destroy<I>(
        &self,
        spec: Spec<Self::Config>,
        resource: Option<Self::Resource>,
        client: &I,
    ) -> ProviderResult<()>
    where
        I: InfoClient;
}
