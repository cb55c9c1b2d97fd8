/*!

The cluster module: an EKS control plane placed into a network, with one managed node group per
entry in the node group map. The module wraps `terraform-aws-modules/eks/aws` and exposes the
cluster's API endpoint.

!*/

use crate::constants::{DEFAULT_CLUSTER_VERSION, EKS_MODULE_SOURCE, EKS_MODULE_VERSION};
use crate::error::{self, Result};
use crate::expression::template;
use crate::network::NetworkRefs;
use crate::node_group::NodeGroups;
use crate::TfValue;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use snafu::ResultExt;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfig {
    /// The Kubernetes version of the control plane, e.g. "1.29". Keep it quoted in YAML.
    pub cluster_version: String,

    /// Whether the API endpoint is reachable from outside the VPC.
    pub endpoint_public_access: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster_version: DEFAULT_CLUSTER_VERSION.to_string(),
            endpoint_public_access: true,
        }
    }
}

/// The inputs of a `module "cluster"` block. Built from the refs of a declared network, which is
/// also what the block's `depends_on` names.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClusterInputs {
    pub app_name: TfValue<String>,
    pub region: TfValue<String>,
    pub vpc_id: TfValue<String>,
    pub public_subnet_ids: TfValue<Vec<String>>,
    pub private_subnet_ids: TfValue<Vec<String>>,
    pub eks_managed_node_groups: NodeGroups,
    #[serde(skip)]
    depends_on: String,
}

impl ClusterInputs {
    pub fn from_network(network: &NetworkRefs, node_groups: NodeGroups) -> Self {
        Self {
            app_name: TfValue::expression("var.app_name"),
            region: TfValue::expression("var.region"),
            vpc_id: network.vpc_id(),
            public_subnet_ids: network.public_subnet_ids(),
            private_subnet_ids: network.private_subnet_ids(),
            eks_managed_node_groups: node_groups,
            depends_on: network.module_address(),
        }
    }

    pub fn depends_on(&self) -> &str {
        &self.depends_on
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusterModule {
    name: String,
    config: ClusterConfig,
    inputs: ClusterInputs,
}

impl ClusterModule {
    pub fn new<S: Into<String>>(name: S, config: ClusterConfig, inputs: ClusterInputs) -> Self {
        Self {
            name: name.into(),
            config,
            inputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validate(&self) -> Result<()> {
        self.inputs.eks_managed_node_groups.validate()
    }

    /// The `module "<name>"` block of the root composition.
    pub fn module_block(&self, source: &str) -> Result<Value> {
        let mut block = json!({ "source": source });
        if let (Value::Object(block), Value::Object(inputs)) =
            (&mut block, to_value(&self.inputs)?)
        {
            block.extend(inputs);
            block.insert(
                "depends_on".to_string(),
                json!([self.inputs.depends_on()]),
            );
        }
        Ok(block)
    }

    /// `module.<name>.cluster_endpoint`
    pub fn endpoint_ref(&self) -> String {
        template(format!("module.{}.cluster_endpoint", self.name))
    }

    /// The module's own configuration.
    pub fn render(&self) -> Value {
        json!({
            "variable": {
                "app_name": { "type": "string" },
                "region": { "type": "string" },
                "vpc_id": { "type": "string" },
                "public_subnet_ids": { "type": "list(string)" },
                "private_subnet_ids": { "type": "list(string)" },
                "eks_managed_node_groups": { "type": "any" }
            },
            "module": {
                "eks": {
                    "source": EKS_MODULE_SOURCE,
                    "version": EKS_MODULE_VERSION,
                    "cluster_name": template("var.app_name"),
                    "cluster_version": self.config.cluster_version,
                    "cluster_endpoint_public_access": self.config.endpoint_public_access,
                    "enable_cluster_creator_admin_permissions": true,
                    "vpc_id": template("var.vpc_id"),
                    "subnet_ids": template("var.private_subnet_ids"),
                    "control_plane_subnet_ids": template("var.public_subnet_ids"),
                    "eks_managed_node_groups": template("var.eks_managed_node_groups")
                }
            },
            "output": {
                "cluster_endpoint": { "value": template("module.eks.cluster_endpoint") }
            }
        })
    }
}

fn to_value(inputs: &ClusterInputs) -> Result<Value> {
    serde_json::to_value(inputs).context(error::SerializeSnafu {
        what: "cluster module inputs",
    })
}

#[cfg(test)]
mod test {
    use super::{ClusterConfig, ClusterInputs, ClusterModule};
    use crate::network::{NetworkConfig, NetworkModule};
    use crate::node_group::{NodeGroupSpec, NodeGroups};
    use serde_json::json;

    fn cluster(node_groups: NodeGroups) -> ClusterModule {
        let network = NetworkModule::new("network", "demo", "us-west-2", NetworkConfig::default());
        ClusterModule::new(
            "cluster",
            ClusterConfig::default(),
            ClusterInputs::from_network(&network.refs(), node_groups),
        )
    }

    #[test]
    fn module_block_depends_on_network() {
        let block = cluster(NodeGroups::cpu_default())
            .module_block("./cluster")
            .unwrap();
        assert_eq!(block["depends_on"], json!(["module.network"]));
        assert_eq!(block["vpc_id"], json!("${module.network.vpc.id}"));
        assert_eq!(
            block["private_subnet_ids"],
            json!("${[for s in module.network.private_subnets : s.id]}")
        );
        assert_eq!(block["region"], json!("${var.region}"));
    }

    #[test]
    fn node_groups_are_forwarded_unmodified() {
        let block = cluster(NodeGroups::cpu_default())
            .module_block("./cluster")
            .unwrap();
        assert_eq!(
            block["eks_managed_node_groups"],
            json!({
                "cpu": {
                    "desired_size": 1,
                    "min_size": 1,
                    "max_size": 2,
                    "instance_types": ["m6i.xlarge"],
                    "capacity_type": "ON_DEMAND",
                    "labels": { "pool": "cpu" }
                }
            })
        );
    }

    #[test]
    fn render_wraps_the_eks_module() {
        let rendered = cluster(NodeGroups::cpu_default()).render();
        let eks = &rendered["module"]["eks"];
        assert_eq!(eks["source"], json!("terraform-aws-modules/eks/aws"));
        assert_eq!(eks["cluster_name"], json!("${var.app_name}"));
        assert_eq!(eks["subnet_ids"], json!("${var.private_subnet_ids}"));
        assert_eq!(
            rendered["output"]["cluster_endpoint"]["value"],
            json!("${module.eks.cluster_endpoint}")
        );
    }

    #[test]
    fn invalid_node_group_is_rejected() {
        let mut groups = NodeGroups::cpu_default();
        groups.insert(
            "gpu",
            NodeGroupSpec {
                desired_size: 3,
                max_size: 2,
                ..NodeGroupSpec::cpu()
            },
        );
        let message = cluster(groups).validate().unwrap_err().to_string();
        assert!(message.contains("'gpu'"));
    }

    #[test]
    fn endpoint_ref() {
        assert_eq!(
            cluster(NodeGroups::cpu_default()).endpoint_ref(),
            "${module.cluster.cluster_endpoint}"
        );
    }
}
