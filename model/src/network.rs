/*!

The network module: one VPC with ordered public and private subnets for an application in a region.

[`NetworkModule::render`] produces the module's own `main.tf.json`. The module exposes the VPC and
the subnet collections as whole objects so that dependents project `.id` themselves; the projection
used by the root composition is available as [`NetworkRefs`].

!*/

use crate::constants::{
    DEFAULT_PRIVATE_SUBNET_CIDRS, DEFAULT_PUBLIC_SUBNET_CIDRS, DEFAULT_VPC_CIDR,
    DEFAULT_ZONE_SUFFIXES,
};
use crate::error::{self, Result};
use crate::expression::template;
use crate::resource_address::ResourceAddress;
use crate::TfValue;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use snafu::{ensure, OptionExt};
use std::net::Ipv4Addr;

/// The user-tunable part of the network. `app_name` and `region` are not part of it; they come from
/// the environment of the run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    pub vpc_cidr: String,
    /// The availability zones subnets are spread across, round robin. Derived from the region when
    /// empty.
    pub availability_zones: Vec<String>,
    pub public_subnet_cidrs: Vec<String>,
    pub private_subnet_cidrs: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            vpc_cidr: DEFAULT_VPC_CIDR.to_string(),
            availability_zones: Vec::new(),
            public_subnet_cidrs: DEFAULT_PUBLIC_SUBNET_CIDRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            private_subnet_cidrs: DEFAULT_PRIVATE_SUBNET_CIDRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl NetworkConfig {
    /// Every resource instance the module declares for this configuration: exactly one VPC, one
    /// public subnet per public CIDR and one private subnet per private CIDR, plus the routing that
    /// makes them usable.
    pub fn planned_resources(&self) -> Vec<ResourceAddress> {
        let public = self.public_subnet_cidrs.len();
        let private = self.private_subnet_cidrs.len();
        let mut addresses = vec![
            ResourceAddress::single("aws_vpc", "this"),
            ResourceAddress::single("aws_internet_gateway", "this"),
        ];
        addresses.extend(ResourceAddress::counted("aws_subnet", "public", public));
        addresses.push(ResourceAddress::single("aws_route_table", "public"));
        addresses.push(ResourceAddress::single("aws_route", "public_internet"));
        addresses.extend(ResourceAddress::counted(
            "aws_route_table_association",
            "public",
            public,
        ));
        addresses.push(ResourceAddress::single("aws_eip", "nat"));
        addresses.push(ResourceAddress::single("aws_nat_gateway", "this"));
        addresses.extend(ResourceAddress::counted("aws_subnet", "private", private));
        addresses.push(ResourceAddress::single("aws_route_table", "private"));
        addresses.push(ResourceAddress::single("aws_route", "private_nat"));
        addresses.extend(ResourceAddress::counted(
            "aws_route_table_association",
            "private",
            private,
        ));
        addresses
    }

    fn validate(&self) -> Result<()> {
        validate_cidr(&self.vpc_cidr)?;
        ensure!(
            !self.public_subnet_cidrs.is_empty(),
            error::InvalidNetworkSnafu {
                reason: "at least one public subnet is required",
            }
        );
        ensure!(
            !self.private_subnet_cidrs.is_empty(),
            error::InvalidNetworkSnafu {
                reason: "at least one private subnet is required",
            }
        );
        for cidr in self
            .public_subnet_cidrs
            .iter()
            .chain(self.private_subnet_cidrs.iter())
        {
            validate_cidr(cidr)?;
        }
        Ok(())
    }
}

/// A declared network module, bound to the application and region of the run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkModule {
    name: String,
    app_name: String,
    region: String,
    config: NetworkConfig,
}

impl NetworkModule {
    pub fn new<S1, S2, S3>(name: S1, app_name: S2, region: S3, config: NetworkConfig) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            name: name.into(),
            app_name: app_name.into(),
            region: region.into(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// The configured zones, or `<region>a` and `<region>b`.
    pub fn availability_zones(&self) -> Vec<String> {
        if self.config.availability_zones.is_empty() {
            DEFAULT_ZONE_SUFFIXES
                .iter()
                .map(|suffix| format!("{}{}", self.region, suffix))
                .collect()
        } else {
            self.config.availability_zones.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.app_name.trim().is_empty(),
            error::InvalidNetworkSnafu {
                reason: "the application name is empty",
            }
        );
        ensure!(
            !self.region.trim().is_empty(),
            error::InvalidNetworkSnafu {
                reason: "the region is empty",
            }
        );
        self.config.validate()
    }

    /// The symbolic outputs of this module, for wiring into dependents.
    pub fn refs(&self) -> NetworkRefs {
        NetworkRefs {
            module_name: self.name.clone(),
        }
    }

    /// The `module "<name>"` block of the root composition.
    pub fn module_block(&self, source: &str) -> Value {
        json!({
            "source": source,
            "app_name": template("var.app_name"),
            "region": template("var.region"),
            "vpc_cidr": self.config.vpc_cidr,
            "availability_zones": self.availability_zones(),
            "public_subnet_cidrs": self.config.public_subnet_cidrs,
            "private_subnet_cidrs": self.config.private_subnet_cidrs,
        })
    }

    /// The module's own configuration.
    pub fn render(&self) -> Value {
        json!({
            "variable": {
                "app_name": { "type": "string" },
                "region": { "type": "string" },
                "vpc_cidr": { "type": "string" },
                "availability_zones": { "type": "list(string)" },
                "public_subnet_cidrs": { "type": "list(string)" },
                "private_subnet_cidrs": { "type": "list(string)" }
            },
            "resource": {
                "aws_vpc": {
                    "this": {
                        "cidr_block": template("var.vpc_cidr"),
                        "enable_dns_hostnames": true,
                        "enable_dns_support": true,
                        "tags": { "Name": "${var.app_name}-vpc" }
                    }
                },
                "aws_internet_gateway": {
                    "this": {
                        "vpc_id": template("aws_vpc.this.id"),
                        "tags": { "Name": "${var.app_name}-igw" }
                    }
                },
                "aws_subnet": {
                    "public": subnet_resource("public", "kubernetes.io/role/elb", true),
                    "private": subnet_resource("private", "kubernetes.io/role/internal-elb", false)
                },
                "aws_route_table": {
                    "public": {
                        "vpc_id": template("aws_vpc.this.id"),
                        "tags": { "Name": "${var.app_name}-public" }
                    },
                    "private": {
                        "vpc_id": template("aws_vpc.this.id"),
                        "tags": { "Name": "${var.app_name}-private" }
                    }
                },
                "aws_route": {
                    "public_internet": {
                        "route_table_id": template("aws_route_table.public.id"),
                        "destination_cidr_block": "0.0.0.0/0",
                        "gateway_id": template("aws_internet_gateway.this.id")
                    },
                    "private_nat": {
                        "route_table_id": template("aws_route_table.private.id"),
                        "destination_cidr_block": "0.0.0.0/0",
                        "nat_gateway_id": template("aws_nat_gateway.this.id")
                    }
                },
                "aws_route_table_association": {
                    "public": association_resource("public"),
                    "private": association_resource("private")
                },
                "aws_eip": {
                    "nat": {
                        "domain": "vpc",
                        "tags": { "Name": "${var.app_name}-nat" }
                    }
                },
                "aws_nat_gateway": {
                    "this": {
                        "allocation_id": template("aws_eip.nat.id"),
                        "subnet_id": template("aws_subnet.public[0].id"),
                        "depends_on": ["aws_internet_gateway.this"],
                        "tags": { "Name": "${var.app_name}-nat" }
                    }
                }
            },
            "output": {
                "vpc": { "value": template("aws_vpc.this") },
                "public_subnets": { "value": template("aws_subnet.public") },
                "private_subnets": { "value": template("aws_subnet.private") }
            }
        })
    }
}

fn subnet_resource(kind: &str, role_tag: &str, public: bool) -> Value {
    let cidrs = format!("var.{}_subnet_cidrs", kind);
    json!({
        "count": template(format!("length({})", cidrs)),
        "vpc_id": template("aws_vpc.this.id"),
        "cidr_block": template(format!("{}[count.index]", cidrs)),
        "availability_zone": template("element(var.availability_zones, count.index)"),
        "map_public_ip_on_launch": public,
        "tags": {
            "Name": format!("${{var.app_name}}-{}-${{count.index}}", kind),
            role_tag: "1"
        }
    })
}

fn association_resource(kind: &str) -> Value {
    json!({
        "count": template(format!("length(var.{}_subnet_cidrs)", kind)),
        "subnet_id": template(format!("aws_subnet.{}[count.index].id", kind)),
        "route_table_id": template(format!("aws_route_table.{}.id", kind))
    })
}

fn validate_cidr(cidr: &str) -> Result<()> {
    let (address, prefix) = cidr
        .split_once('/')
        .context(error::InvalidCidrSnafu { cidr })?;
    let valid = address.parse::<Ipv4Addr>().is_ok()
        && !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_digit())
        && prefix.parse::<u8>().map(|p| p <= 32).unwrap_or(false);
    ensure!(valid, error::InvalidCidrSnafu { cidr });
    Ok(())
}

/// The symbolic outputs of a declared network module. It can only be obtained from a
/// [`NetworkModule`], so a cluster wired from it always has a network to depend on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkRefs {
    module_name: String,
}

impl NetworkRefs {
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// The `module.<name>` address used in `depends_on`.
    pub fn module_address(&self) -> String {
        format!("module.{}", self.module_name)
    }

    pub fn vpc_id(&self) -> TfValue<String> {
        TfValue::expression(format!("module.{}.vpc.id", self.module_name))
    }

    /// `[for s in module.<name>.public_subnets : s.id]`, which keeps order and cardinality.
    pub fn public_subnet_ids(&self) -> TfValue<Vec<String>> {
        self.subnet_ids("public_subnets")
    }

    pub fn private_subnet_ids(&self) -> TfValue<Vec<String>> {
        self.subnet_ids("private_subnets")
    }

    fn subnet_ids(&self, output: &str) -> TfValue<Vec<String>> {
        TfValue::expression(format!(
            "[for s in module.{}.{} : s.id]",
            self.module_name, output
        ))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Vpc {
    pub id: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    /// The `count.index` the subnet was created with.
    pub index: usize,
}

/// Concrete network outputs, as read back from provisioning state.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkOutputs {
    pub vpc: Vpc,
    pub public_subnets: Vec<Subnet>,
    pub private_subnets: Vec<Subnet>,
}

impl NetworkOutputs {
    pub fn public_subnet_ids(&self) -> Vec<String> {
        project_ids(&self.public_subnets)
    }

    pub fn private_subnet_ids(&self) -> Vec<String> {
        project_ids(&self.private_subnets)
    }
}

fn project_ids(subnets: &[Subnet]) -> Vec<String> {
    subnets.iter().map(|subnet| subnet.id.clone()).collect()
}
