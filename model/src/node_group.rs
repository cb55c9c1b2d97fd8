/*!

Managed node group specifications. A spec is forwarded to the EKS module unmodified; the only thing
done locally is validating its capacity bounds before anything is submitted.

!*/

use crate::error::{self, Result};
use maplit::btreemap;
use serde::{Deserialize, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use snafu::ensure;
use std::collections::btree_map::Iter;
use std::collections::BTreeMap;

/// The name of the node group that the default composition declares.
pub const CPU_NODE_GROUP: &str = "cpu";
pub const CPU_INSTANCE_TYPE: &str = "m6i.xlarge";

/// The purchasing model for the instances in a node group.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityType {
    OnDemand,
    Spot,
}

impl Default for CapacityType {
    fn default() -> Self {
        Self::OnDemand
    }
}

derive_display_from_serialize!(CapacityType);
derive_fromstr_from_deserialize!(CapacityType);

/// The desired compute pool for one managed node group. Field names match the inputs of the
/// `terraform-aws-modules/eks/aws` `eks_managed_node_groups` map.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NodeGroupSpec {
    pub desired_size: u32,
    pub min_size: u32,
    pub max_size: u32,
    pub instance_types: Vec<String>,
    #[serde(default)]
    pub capacity_type: CapacityType,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl NodeGroupSpec {
    /// `pool=cpu`, one `m6i.xlarge` on-demand node that may scale to two.
    pub fn cpu() -> Self {
        Self {
            desired_size: 1,
            min_size: 1,
            max_size: 2,
            instance_types: vec![CPU_INSTANCE_TYPE.to_string()],
            capacity_type: CapacityType::OnDemand,
            labels: btreemap! { "pool".to_string() => CPU_NODE_GROUP.to_string() },
        }
    }

    /// Checks `min_size <= desired_size <= max_size`, a non-zero maximum and at least one instance
    /// type.
    pub fn validate(&self, name: &str) -> Result<()> {
        ensure!(
            !name.trim().is_empty(),
            error::InvalidNodeGroupSnafu {
                name,
                reason: "the node group name is empty",
            }
        );
        ensure!(
            self.max_size > 0,
            error::InvalidNodeGroupSnafu {
                name,
                reason: "max_size must be greater than zero",
            }
        );
        ensure!(
            self.min_size <= self.desired_size,
            error::InvalidNodeGroupSnafu {
                name,
                reason: format!(
                    "min_size ({}) is greater than desired_size ({})",
                    self.min_size, self.desired_size
                ),
            }
        );
        ensure!(
            self.desired_size <= self.max_size,
            error::InvalidNodeGroupSnafu {
                name,
                reason: format!(
                    "desired_size ({}) is greater than max_size ({})",
                    self.desired_size, self.max_size
                ),
            }
        );
        ensure!(
            !self.instance_types.is_empty(),
            error::InvalidNodeGroupSnafu {
                name,
                reason: "at least one instance type is required",
            }
        );
        Ok(())
    }
}

/// Node group specs keyed by group name.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeGroups(BTreeMap<String, NodeGroupSpec>);

impl NodeGroups {
    /// The single `cpu` group the default composition provisions.
    pub fn cpu_default() -> Self {
        Self(btreemap! { CPU_NODE_GROUP.to_string() => NodeGroupSpec::cpu() })
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, spec: NodeGroupSpec) -> Option<NodeGroupSpec> {
        self.0.insert(name.into(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&NodeGroupSpec> {
        self.0.get(name)
    }

    pub fn iter(&self) -> Iter<'_, String, NodeGroupSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validates every group. A cluster without any node group is rejected.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.0.is_empty(),
            error::InvalidNodeGroupSnafu {
                name: "",
                reason: "at least one node group is required",
            }
        );
        for (name, spec) in &self.0 {
            spec.validate(name)?;
        }
        Ok(())
    }
}

impl From<BTreeMap<String, NodeGroupSpec>> for NodeGroups {
    fn from(groups: BTreeMap<String, NodeGroupSpec>) -> Self {
        Self(groups)
    }
}
