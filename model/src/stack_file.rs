use crate::cluster::ClusterConfig;
use crate::error::{self, Result};
use crate::network::NetworkConfig;
use crate::node_group::NodeGroups;
use log::debug;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::path::Path;

/// The optional YAML description of a stack. Anything left out takes the default composition's
/// value, so an empty file describes the same stack as no file at all.
///
/// ```yaml
/// network:
///   publicSubnetCidrs: ["10.0.1.0/24"]
/// cluster:
///   clusterVersion: "1.30"
/// nodeGroups:
///   cpu:
///     desired_size: 1
///     min_size: 1
///     max_size: 3
///     instance_types: ["m6i.xlarge"]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackFile {
    pub network: NetworkConfig,
    pub cluster: ClusterConfig,
    pub node_groups: NodeGroups,
}

impl Default for StackFile {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            cluster: ClusterConfig::default(),
            node_groups: NodeGroups::cpu_default(),
        }
    }
}

impl StackFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading stack file '{}'", path.display());
        let contents = std::fs::read_to_string(path).context(error::StackFileReadSnafu { path })?;
        Self::from_yaml(&contents).context(error::StackFileParseSnafu { path })
    }

    fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}
