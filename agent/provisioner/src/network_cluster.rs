/*!

The network + cluster provider. Creation renders the root composition into a working directory and
runs `terraform init` and `terraform apply`; destruction renders the same configuration and runs
`terraform init` and `terraform destroy`, then checks that nothing managed is left in the state.

!*/

use crate::clients::InfoClient;
use crate::provider::{
    Create, Destroy, IntoProviderError, ProviderError, ProviderResult, Resources, Spec,
};
use crate::terraform::Terraform;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use stack_model::{Composition, Configuration, NetworkOutputs, StackFile};
use stack_utils::command::CommandRunner;
use stack_utils::{impl_display_as_json, json_display};
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkClusterConfig {
    pub app_name: String,
    pub region: String,

    /// Where the configuration is rendered and where `terraform` keeps its working files.
    pub working_dir: PathBuf,

    #[serde(default)]
    pub stack: StackFile,
}

impl Configuration for NetworkClusterConfig {}
impl_display_as_json!(NetworkClusterConfig);

impl NetworkClusterConfig {
    pub fn composition(&self) -> Composition {
        Composition::new(&self.app_name, &self.region, self.stack.clone())
    }
}

/// The progress memo of a network + cluster run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningMemo {
    pub current_status: String,

    pub app_name: Option<String>,

    pub region: Option<String>,

    /// Set once `terraform apply` or `terraform destroy` has been started.
    pub provisioning_started: bool,

    /// The number of managed resources in the state after the last apply or destroy.
    pub managed_resources: Option<usize>,
}

impl Configuration for ProvisioningMemo {}
impl_display_as_json!(ProvisioningMemo);

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStack {
    pub app_name: String,

    pub region: String,

    /// The EKS API server endpoint, as published by the root composition.
    pub cluster_endpoint: String,

    /// The VPC and subnets, when the state exposes them.
    pub network: Option<NetworkOutputs>,
}

impl Configuration for CreatedStack {}
impl_display_as_json!(CreatedStack);

async fn send_status<I>(
    client: &I,
    memo: &mut ProvisioningMemo,
    status: &str,
    resources: Resources,
) -> ProviderResult<()>
where
    I: InfoClient,
{
    memo.current_status = status.to_string();
    client
        .send_info(memo.clone())
        .await
        .context(resources, "Error sending provisioning status")
}

pub struct NetworkClusterCreator<R>
where
    R: CommandRunner,
{
    runner: R,
}

impl<R> NetworkClusterCreator<R>
where
    R: CommandRunner,
{
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait::async_trait]
impl<R> Create for NetworkClusterCreator<R>
where
    R: CommandRunner,
{
    type Config = NetworkClusterConfig;
    type Info = ProvisioningMemo;
    type Resource = CreatedStack;

    async fn create<I>(
        &self,
        spec: Spec<Self::Config>,
        client: &I,
    ) -> ProviderResult<Self::Resource>
    where
        I: InfoClient,
    {
        debug!("Create starting with spec: \n{}", json_display(&spec));
        let mut memo: ProvisioningMemo = client
            .get_info()
            .await
            .context(Resources::Clear, "Unable to get info from client")?;
        let config = spec.configuration;
        memo.app_name = Some(config.app_name.clone());
        memo.region = Some(config.region.clone());

        send_status(client, &mut memo, "Rendering configuration", Resources::Clear).await?;
        let composition = config.composition();
        let rendered = composition
            .render()
            .context(Resources::Clear, "Invalid stack configuration")?;
        rendered.write_to(&config.working_dir).context(
            Resources::Clear,
            format!(
                "Unable to write configuration to '{}'",
                config.working_dir.display()
            ),
        )?;

        let terraform = Terraform::new(&self.runner, &config.working_dir, spec.variables);
        send_status(client, &mut memo, "Initializing terraform", Resources::Clear).await?;
        terraform
            .init()
            .context(Resources::Clear, "Unable to initialize terraform")?;

        memo.provisioning_started = true;
        send_status(
            client,
            &mut memo,
            "Provisioning network and cluster",
            Resources::Clear,
        )
        .await?;
        terraform
            .apply()
            .context(Resources::Remaining, "Unable to provision the network and cluster")?;

        send_status(
            client,
            &mut memo,
            "Reading provisioning state",
            Resources::Remaining,
        )
        .await?;
        let state = terraform
            .show()
            .context(Resources::Remaining, "Unable to read provisioning state")?;
        let cluster_endpoint = state
            .cluster_endpoint()
            .context(Resources::Remaining, "The cluster endpoint was not published")?;
        let network = state.network_outputs(composition.network().name());
        memo.managed_resources = Some(state.managed_resources().len());

        send_status(client, &mut memo, "Cluster ready", Resources::Remaining).await?;
        let created = CreatedStack {
            app_name: config.app_name,
            region: config.region,
            cluster_endpoint,
            network,
        };
        debug!("CreatedStack: \n{}", created);
        Ok(created)
    }
}

pub struct NetworkClusterDestroyer<R>
where
    R: CommandRunner,
{
    runner: R,
}

impl<R> NetworkClusterDestroyer<R>
where
    R: CommandRunner,
{
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait::async_trait]
impl<R> Destroy for NetworkClusterDestroyer<R>
where
    R: CommandRunner,
{
    type Config = NetworkClusterConfig;
    type Info = ProvisioningMemo;
    type Resource = CreatedStack;

    async fn destroy<I>(
        &self,
        spec: Spec<Self::Config>,
        resource: Option<Self::Resource>,
        client: &I,
    ) -> ProviderResult<()>
    where
        I: InfoClient,
    {
        let mut memo: ProvisioningMemo = client
            .get_info()
            .await
            .context(Resources::Unknown, "Unable to get info from client")?;
        let config = spec.configuration;
        match &resource {
            Some(created) => info!(
                "Destroying cluster '{}' at '{}'",
                created.app_name, created.cluster_endpoint
            ),
            None => info!("Destroying stack '{}' from configuration", config.app_name),
        }
        memo.app_name = Some(config.app_name.clone());
        memo.region = Some(config.region.clone());

        // Destroy needs the same configuration the state was created from.
        send_status(client, &mut memo, "Rendering configuration", Resources::Unknown).await?;
        config
            .composition()
            .render()
            .context(Resources::Unknown, "Invalid stack configuration")?
            .write_to(&config.working_dir)
            .context(
                Resources::Unknown,
                format!(
                    "Unable to write configuration to '{}'",
                    config.working_dir.display()
                ),
            )?;

        let terraform = Terraform::new(&self.runner, &config.working_dir, spec.variables);
        send_status(client, &mut memo, "Initializing terraform", Resources::Unknown).await?;
        terraform
            .init()
            .context(Resources::Unknown, "Unable to initialize terraform")?;

        memo.provisioning_started = true;
        send_status(
            client,
            &mut memo,
            "Destroying network and cluster",
            Resources::Unknown,
        )
        .await?;
        terraform
            .destroy()
            .context(Resources::Remaining, "Unable to destroy the network and cluster")?;

        let state = terraform
            .show()
            .context(Resources::Unknown, "Unable to read provisioning state")?;
        let remaining: Vec<&str> = state
            .managed_resources()
            .iter()
            .map(|resource| resource.address.as_str())
            .collect();
        memo.managed_resources = Some(remaining.len());
        if !remaining.is_empty() {
            send_status(client, &mut memo, "Resources remain", Resources::Remaining).await?;
            return Err(ProviderError::new_with_context(
                Resources::Remaining,
                format!(
                    "{} managed resources remain after destroy: {}",
                    remaining.len(),
                    remaining.join(", ")
                ),
            ));
        }

        send_status(client, &mut memo, "Destroy complete", Resources::Clear).await?;
        Ok(())
    }
}
