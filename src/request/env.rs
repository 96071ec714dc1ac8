//! Environment variables read into a [`super::ClusterRequest`].
//!
//! Shared with the build script, so this file must not import anything from
//! the crate.

/// AWS region.
pub const AWS_REGION: &str = "AWS_REGION";
/// Optional shared-config profile.
pub const AWS_PROFILE: &str = "AWS_PROFILE";
/// Cluster identifier.
pub const CLUSTER_ID: &str = "CLUSTER_ID";
/// Database engine.
pub const ENGINE: &str = "ENGINE";
/// Engine version.
pub const ENGINE_VERSION: &str = "ENGINE_VERSION";
/// Master user name.
pub const MASTER_USERNAME: &str = "MASTER_USERNAME";
/// Master password.
pub const MASTER_USER_PASSWORD: &str = "MASTER_USER_PASSWORD";
/// Subnet group name.
pub const SUBNET_GROUP_NAME: &str = "SUBNET_GROUP_NAME";
/// Subnet group description.
pub const SUBNET_GROUP_DESCRIPTION: &str = "SUBNET_GROUP_DESCRIPTION";
/// Comma-separated security group identifiers.
pub const SECURITY_GROUP_IDS: &str = "SECURITY_GROUP_IDS";
/// Comma-separated subnet identifiers.
pub const SUBNETS: &str = "SUBNETS";
/// Instance identifier.
pub const INSTANCE_ID: &str = "INSTANCE_ID";
/// Instance class.
pub const INSTANCE_CLASS: &str = "INSTANCE_CLASS";
/// Ready timeout in minutes.
pub const READY_TIMEOUT_MINUTES: &str = "READY_TIMEOUT_MINUTES";
