/*!

The root composition: pins the region and the default tagging policy, declares the network and then
the cluster module (with an explicit dependency edge between them) and publishes the cluster endpoint
as its only output.

!*/

use crate::cluster::{ClusterInputs, ClusterModule};
use crate::constants::{
    APPLICATION_TAG_KEY, AWS_PROVIDER_SOURCE, AWS_PROVIDER_VERSION, CLUSTER_ENDPOINT_OUTPUT,
    CLUSTER_MODULE, MODULE_CONFIG_FILE, NETWORK_MODULE, ROOT_CONFIG_FILE,
};
use crate::error::{self, Result};
use crate::expression::template;
use crate::network::NetworkModule;
use crate::stack_file::StackFile;
use log::{debug, info};
use maplit::btreemap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Tags the `aws` provider applies to every resource it creates.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DefaultTags {
    pub tags: BTreeMap<String, String>,
}

impl DefaultTags {
    /// The single `Application` tag, valued with the `app_name` variable.
    pub fn application() -> Self {
        Self {
            tags: btreemap! { APPLICATION_TAG_KEY.to_string() => template("var.app_name") },
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Composition {
    region: String,
    default_tags: DefaultTags,
    network: NetworkModule,
    cluster: ClusterModule,
}

impl Composition {
    pub fn new<S1, S2>(app_name: S1, region: S2, stack: StackFile) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let region = region.into();
        let network = NetworkModule::new(NETWORK_MODULE, app_name, region.clone(), stack.network);
        let inputs = ClusterInputs::from_network(&network.refs(), stack.node_groups);
        let cluster = ClusterModule::new(CLUSTER_MODULE, stack.cluster, inputs);
        Self {
            region,
            default_tags: DefaultTags::application(),
            network,
            cluster,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn network(&self) -> &NetworkModule {
        &self.network
    }

    pub fn cluster(&self) -> &ClusterModule {
        &self.cluster
    }

    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.cluster.validate()
    }

    /// Validates and renders the root configuration together with both module directories.
    pub fn render(&self) -> Result<RenderedConfiguration> {
        self.validate()?;
        let network_source = format!("./{}", self.network.name());
        let cluster_source = format!("./{}", self.cluster.name());
        let network_block = self.network.module_block(&network_source);
        let cluster_block = self.cluster.module_block(&cluster_source)?;
        let root = json!({
            "terraform": {
                "required_providers": {
                    "aws": {
                        "source": AWS_PROVIDER_SOURCE,
                        "version": AWS_PROVIDER_VERSION
                    }
                }
            },
            "variable": {
                "app_name": { "type": "string", "default": self.network.app_name() },
                "region": { "type": "string", "default": self.region }
            },
            "provider": {
                "aws": {
                    "region": template("var.region"),
                    "default_tags": self.default_tags
                }
            },
            "module": {
                self.network.name(): network_block,
                self.cluster.name(): cluster_block
            },
            "output": {
                CLUSTER_ENDPOINT_OUTPUT: { "value": self.cluster.endpoint_ref() }
            }
        });

        let files = btreemap! {
            PathBuf::from(ROOT_CONFIG_FILE) => root,
            Path::new(self.network.name()).join(MODULE_CONFIG_FILE) => self.network.render(),
            Path::new(self.cluster.name()).join(MODULE_CONFIG_FILE) => self.cluster.render(),
        };
        Ok(RenderedConfiguration { files })
    }
}

/// A rendered configuration tree: relative file path to JSON document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RenderedConfiguration {
    files: BTreeMap<PathBuf, Value>,
}

impl RenderedConfiguration {
    pub fn files(&self) -> &BTreeMap<PathBuf, Value> {
        &self.files
    }

    pub fn root(&self) -> Option<&Value> {
        self.files.get(Path::new(ROOT_CONFIG_FILE))
    }

    /// Writes every file below `dir`, creating directories as needed. Existing files are
    /// overwritten; anything else in `dir` (such as `.terraform` or state) is left alone.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        info!("Writing configuration to '{}'", dir.display());
        for (relative, document) in &self.files {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context(error::CreateDirSnafu { path: parent })?;
            }
            let contents = serde_json::to_string_pretty(document).context(error::SerializeSnafu {
                what: relative.display().to_string(),
            })?;
            debug!("Writing '{}'", path.display());
            std::fs::write(&path, contents + "\n").context(error::WriteFileSnafu { path: &path })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Composition;
    use crate::node_group::{NodeGroupSpec, NodeGroups};
    use crate::StackFile;
    use serde_json::json;
    use std::path::Path;

    fn composition() -> Composition {
        Composition::new("demo", "us-west-2", StackFile::default())
    }

    #[test]
    fn renders_three_files() {
        let rendered = composition().render().unwrap();
        let paths: Vec<_> = rendered.files().keys().cloned().collect();
        assert_eq!(
            paths,
            vec![
                Path::new("cluster/main.tf.json").to_path_buf(),
                Path::new("main.tf.json").to_path_buf(),
                Path::new("network/main.tf.json").to_path_buf(),
            ]
        );
    }

    #[test]
    fn endpoint_is_the_only_output() {
        let rendered = composition().render().unwrap();
        let root = rendered.root().unwrap();
        assert_eq!(
            root["output"],
            json!({ "cluster_endpoint": { "value": "${module.cluster.cluster_endpoint}" } })
        );
    }

    #[test]
    fn cluster_depends_on_network() {
        let rendered = composition().render().unwrap();
        let root = rendered.root().unwrap();
        assert_eq!(
            root["module"]["cluster"]["depends_on"],
            json!(["module.network"])
        );
        assert_eq!(root["module"]["network"]["source"], json!("./network"));
        assert_eq!(root["module"]["cluster"]["source"], json!("./cluster"));
    }

    #[test]
    fn region_and_default_tags() {
        let rendered = composition().render().unwrap();
        let root = rendered.root().unwrap();
        assert_eq!(root["variable"]["region"]["default"], json!("us-west-2"));
        assert_eq!(root["variable"]["app_name"]["default"], json!("demo"));
        assert_eq!(
            root["provider"]["aws"],
            json!({
                "region": "${var.region}",
                "default_tags": { "tags": { "Application": "${var.app_name}" } }
            })
        );
    }

    #[test]
    fn default_cpu_group_reaches_the_cluster() {
        let rendered = composition().render().unwrap();
        let root = rendered.root().unwrap();
        assert_eq!(
            root["module"]["cluster"]["eks_managed_node_groups"]["cpu"],
            serde_json::to_value(NodeGroupSpec::cpu()).unwrap()
        );
    }

    #[test]
    fn invalid_stack_is_not_rendered() {
        let mut node_groups = NodeGroups::default();
        node_groups.insert(
            "cpu",
            NodeGroupSpec {
                min_size: 2,
                desired_size: 1,
                ..NodeGroupSpec::cpu()
            },
        );
        let stack = StackFile {
            node_groups,
            ..StackFile::default()
        };
        assert!(Composition::new("demo", "us-west-2", stack).render().is_err());
    }

    #[test]
    fn write_tree() {
        let dir = tempfile::tempdir().unwrap();
        composition().render().unwrap().write_to(dir.path()).unwrap();
        assert!(dir.path().join("main.tf.json").is_file());
        assert!(dir.path().join("network/main.tf.json").is_file());
        let cluster: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("cluster/main.tf.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            cluster["module"]["eks"]["eks_managed_node_groups"],
            json!("${var.eks_managed_node_groups}")
        );
    }
}
