//! Names and defaults shared by the rendered Terraform configuration and its callers.

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_TAG: &str = "latest";
pub const DEFAULT_CLUSTER_VERSION: &str = "1.29";
pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";
pub const DEFAULT_PUBLIC_SUBNET_CIDRS: [&str; 2] = ["10.0.1.0/24", "10.0.2.0/24"];
pub const DEFAULT_PRIVATE_SUBNET_CIDRS: [&str; 2] = ["10.0.101.0/24", "10.0.102.0/24"];
/// Zone suffixes appended to the region when no availability zones are configured.
pub const DEFAULT_ZONE_SUFFIXES: [&str; 2] = ["a", "b"];

// Module wiring
pub const NETWORK_MODULE: &str = "network";
pub const CLUSTER_MODULE: &str = "cluster";
pub const EKS_MODULE_SOURCE: &str = "terraform-aws-modules/eks/aws";
pub const EKS_MODULE_VERSION: &str = "~> 20.0";
pub const AWS_PROVIDER_SOURCE: &str = "hashicorp/aws";
pub const AWS_PROVIDER_VERSION: &str = "~> 5.0";

// File layout of a rendered configuration
pub const ROOT_CONFIG_FILE: &str = "main.tf.json";
pub const MODULE_CONFIG_FILE: &str = "main.tf.json";
/// Where configuration is rendered and `terraform` runs unless told otherwise.
pub const DEFAULT_WORKING_DIR: &str = "infra";
pub const DEFAULT_ENV_FILE: &str = ".env";

// Outputs
pub const CLUSTER_ENDPOINT_OUTPUT: &str = "cluster_endpoint";

// Tagging
pub const APPLICATION_TAG_KEY: &str = "Application";

// Environment variables
pub const ENV_APP_NAME: &str = "APP_NAME";
pub const ENV_AWS_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_REGISTRY: &str = "REGISTRY";
pub const ENV_REPOSITORY: &str = "REPOSITORY";
pub const ENV_TAG: &str = "TAG";
pub const TF_VAR_PREFIX: &str = "TF_VAR_";
