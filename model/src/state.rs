/*!

A read-only view of the JSON that `terraform show -json` prints for the current state. Only the parts
needed to report on the stack are modeled: outputs and the (nested) module resources.

!*/

use crate::constants::CLUSTER_ENDPOINT_OUTPUT;
use crate::error::{self, Result};
use crate::network::{NetworkOutputs, Subnet, Vpc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub format_version: Option<String>,
    #[serde(default)]
    pub terraform_version: Option<String>,
    /// Absent when the state is empty, e.g. right after a destroy.
    #[serde(default)]
    pub values: Option<StateValues>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateValues {
    #[serde(default)]
    pub outputs: BTreeMap<String, StateOutput>,
    #[serde(default)]
    pub root_module: StateModule,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateOutput {
    #[serde(default)]
    pub sensitive: bool,
    pub value: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateModule {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub resources: Vec<StateResource>,
    #[serde(default)]
    pub child_modules: Vec<StateModule>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateResource {
    pub address: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub index: Option<Value>,
    #[serde(default)]
    pub values: Value,
}

impl StateResource {
    pub fn is_managed(&self) -> bool {
        self.mode == "managed"
    }

    fn id(&self) -> Option<&str> {
        self.values.get("id").and_then(Value::as_str)
    }

    fn count_index(&self) -> usize {
        self.index
            .as_ref()
            .and_then(Value::as_u64)
            .unwrap_or_default() as usize
    }
}

impl StateSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).context(error::StateParseSnafu)
    }

    /// Every managed resource in the state, walking nested modules depth first.
    pub fn managed_resources(&self) -> Vec<&StateResource> {
        let mut resources = Vec::new();
        if let Some(values) = &self.values {
            collect_managed(&values.root_module, &mut resources);
        }
        resources
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.values
            .as_ref()
            .and_then(|values| values.outputs.get(name))
            .map(|output| &output.value)
    }

    pub fn cluster_endpoint(&self) -> Result<String> {
        let value = self.output(CLUSTER_ENDPOINT_OUTPUT).context(error::OutputMissingSnafu {
            name: CLUSTER_ENDPOINT_OUTPUT,
        })?;
        value
            .as_str()
            .map(str::to_string)
            .context(error::OutputTypeSnafu {
                name: CLUSTER_ENDPOINT_OUTPUT,
            })
    }

    /// The VPC and subnets that the network module named `module_name` created, with subnets in
    /// `count.index` order. `None` if the module has no VPC in the state.
    pub fn network_outputs(&self, module_name: &str) -> Option<NetworkOutputs> {
        let address = format!("module.{}", module_name);
        let module = self
            .values
            .as_ref()
            .and_then(|values| find_module(&values.root_module, &address))?;
        let vpc = module
            .resources
            .iter()
            .find(|r| r.is_managed() && r.resource_type == "aws_vpc")
            .and_then(StateResource::id)?;
        Some(NetworkOutputs {
            vpc: Vpc { id: vpc.to_string() },
            public_subnets: subnets(module, "public"),
            private_subnets: subnets(module, "private"),
        })
    }
}

fn collect_managed<'a>(module: &'a StateModule, resources: &mut Vec<&'a StateResource>) {
    resources.extend(module.resources.iter().filter(|r| r.is_managed()));
    for child in &module.child_modules {
        collect_managed(child, resources);
    }
}

fn find_module<'a>(module: &'a StateModule, address: &str) -> Option<&'a StateModule> {
    if module.address.as_deref() == Some(address) {
        return Some(module);
    }
    module
        .child_modules
        .iter()
        .find_map(|child| find_module(child, address))
}

fn subnets(module: &StateModule, name: &str) -> Vec<Subnet> {
    let mut subnets: Vec<Subnet> = module
        .resources
        .iter()
        .filter(|r| r.is_managed() && r.resource_type == "aws_subnet" && r.name == name)
        .filter_map(|r| {
            r.id().map(|id| Subnet {
                id: id.to_string(),
                index: r.count_index(),
            })
        })
        .collect();
    subnets.sort_by_key(|subnet| subnet.index);
    subnets
}

#[cfg(test)]
mod test {
    use super::StateSnapshot;

    const STATE: &str = r#"{
  "format_version": "1.0",
  "terraform_version": "1.7.5",
  "values": {
    "outputs": {
      "cluster_endpoint": {
        "sensitive": false,
        "value": "https://ABCDEF.gr7.us-west-2.eks.amazonaws.com",
        "type": "string"
      }
    },
    "root_module": {
      "child_modules": [
        {
          "address": "module.network",
          "resources": [
            {
              "address": "module.network.aws_subnet.public[1]",
              "mode": "managed",
              "type": "aws_subnet",
              "name": "public",
              "index": 1,
              "values": { "id": "subnet-pub-1" }
            },
            {
              "address": "module.network.aws_subnet.public[0]",
              "mode": "managed",
              "type": "aws_subnet",
              "name": "public",
              "index": 0,
              "values": { "id": "subnet-pub-0" }
            },
            {
              "address": "module.network.aws_subnet.private[0]",
              "mode": "managed",
              "type": "aws_subnet",
              "name": "private",
              "index": 0,
              "values": { "id": "subnet-priv-0" }
            },
            {
              "address": "module.network.aws_vpc.this",
              "mode": "managed",
              "type": "aws_vpc",
              "name": "this",
              "values": { "id": "vpc-123" }
            }
          ]
        },
        {
          "address": "module.cluster",
          "child_modules": [
            {
              "address": "module.cluster.module.eks",
              "resources": [
                {
                  "address": "module.cluster.module.eks.aws_eks_cluster.this[0]",
                  "mode": "managed",
                  "type": "aws_eks_cluster",
                  "name": "this",
                  "index": 0,
                  "values": { "id": "demo" }
                },
                {
                  "address": "module.cluster.module.eks.data.aws_partition.current",
                  "mode": "data",
                  "type": "aws_partition",
                  "name": "current",
                  "values": {}
                }
              ]
            }
          ]
        }
      ]
    }
  }
}"#;

    #[test]
    fn counts_managed_resources_in_nested_modules() {
        let state = StateSnapshot::from_json(STATE).unwrap();
        assert_eq!(state.managed_resources().len(), 5);
    }

    #[test]
    fn cluster_endpoint() {
        let state = StateSnapshot::from_json(STATE).unwrap();
        assert_eq!(
            state.cluster_endpoint().unwrap(),
            "https://ABCDEF.gr7.us-west-2.eks.amazonaws.com"
        );
    }

    #[test]
    fn network_outputs_in_index_order() {
        let state = StateSnapshot::from_json(STATE).unwrap();
        let network = state.network_outputs("network").unwrap();
        assert_eq!(network.vpc.id, "vpc-123");
        assert_eq!(
            network.public_subnet_ids(),
            vec!["subnet-pub-0", "subnet-pub-1"]
        );
        assert_eq!(network.private_subnet_ids(), vec!["subnet-priv-0"]);
        assert!(state.network_outputs("missing").is_none());
    }

    #[test]
    fn empty_state() {
        let state = StateSnapshot::from_json(r#"{"format_version":"1.0"}"#).unwrap();
        assert!(state.managed_resources().is_empty());
        assert!(state.cluster_endpoint().is_err());
        assert!(StateSnapshot::from_json("").unwrap().managed_resources().is_empty());
    }
}
