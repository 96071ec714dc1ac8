//! Backend abstraction over the RDS control plane.
//!
//! Reconcilers and the readiness poller only ever talk to an
//! [`RdsBackend`]. The production implementation lives in
//! [`crate::rds`]; tests use [`crate::test_support::FakeRds`].

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::fault::ProviderError;

/// Status string the provider reports for a resource that is ready.
pub const AVAILABLE: &str = "available";

/// Master password for a cluster. `Debug` output never shows the value.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct MasterPassword(String);

impl MasterPassword {
    /// Wraps a password.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain text password for the provider call.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` when no password has been supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterPassword(***)")
    }
}

/// A DB subnet group as reported by the provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubnetGroup {
    /// Subnet group name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Member subnet identifiers.
    pub subnet_ids: Vec<String>,
    /// Provider status (for example `Complete`).
    pub status: String,
}

/// An Aurora DB cluster as reported by the provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cluster {
    /// Cluster identifier.
    pub identifier: String,
    /// Database engine (for example `aurora-postgresql`).
    pub engine: String,
    /// Engine version currently running.
    pub engine_version: String,
    /// Master user name.
    pub master_username: String,
    /// Attached VPC security groups.
    pub security_group_ids: BTreeSet<String>,
    /// Name of the subnet group the cluster lives in.
    pub subnet_group: String,
    /// Provider status (for example `creating`, `available`).
    pub status: String,
}

/// A DB instance that belongs to a cluster.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    /// Instance identifier.
    pub identifier: String,
    /// Identifier of the owning cluster.
    pub cluster_identifier: String,
    /// Engine inherited from the cluster.
    pub engine: String,
    /// Instance class (for example `db.r5.large`).
    pub instance_class: String,
    /// Provider status.
    pub status: String,
}

/// Desired state of a subnet group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubnetGroupSpec {
    /// Subnet group name.
    pub name: String,
    /// Description used on creation.
    pub description: String,
    /// Subnets to include, in the order given.
    pub subnet_ids: Vec<String>,
}

/// Desired state of a cluster.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusterSpec {
    /// Cluster identifier.
    pub identifier: String,
    /// Database engine.
    pub engine: String,
    /// Requested engine version.
    pub engine_version: String,
    /// Master user name.
    pub master_username: String,
    /// Master password.
    pub master_user_password: MasterPassword,
    /// VPC security groups to attach.
    pub security_group_ids: BTreeSet<String>,
    /// Subnet group the cluster is placed in.
    pub subnet_group_name: String,
}

/// Immediate modification applied to an existing cluster.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusterModification {
    /// Cluster identifier.
    pub identifier: String,
    /// Password to set.
    pub master_user_password: MasterPassword,
    /// Complete set of security groups the cluster should carry.
    pub security_group_ids: BTreeSet<String>,
    /// Engine version to move to, present only when it differs from the
    /// running version.
    pub engine_version: Option<String>,
}

impl ClusterModification {
    /// Computes the modification that moves `existing` towards `desired`.
    ///
    /// Password and security groups are always sent. The engine version is
    /// only included when it differs from the running version.
    #[must_use]
    pub fn between(existing: &Cluster, desired: &ClusterSpec) -> Self {
        let engine_version = (existing.engine_version != desired.engine_version)
            .then(|| desired.engine_version.clone());
        Self {
            identifier: existing.identifier.clone(),
            master_user_password: desired.master_user_password.clone(),
            security_group_ids: desired.security_group_ids.clone(),
            engine_version,
        }
    }
}

/// Desired state of a cluster member instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstanceSpec {
    /// Instance identifier.
    pub identifier: String,
    /// Owning cluster.
    pub cluster_identifier: String,
    /// Engine, taken from the owning cluster.
    pub engine: String,
    /// Instance class.
    pub instance_class: String,
}

impl InstanceSpec {
    /// Builds the spec for an instance inside `cluster`, inheriting its
    /// engine.
    #[must_use]
    pub fn for_cluster(
        cluster: &Cluster,
        identifier: impl Into<String>,
        instance_class: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            cluster_identifier: cluster.identifier.clone(),
            engine: cluster.engine.clone(),
            instance_class: instance_class.into(),
        }
    }
}

/// Immediate modification applied to an existing instance. Only the class
/// is ever changed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstanceModification {
    /// Instance identifier.
    pub identifier: String,
    /// Instance class to apply.
    pub instance_class: String,
}

/// Future returned by backend operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Describe, create and modify operations for the three resource kinds.
///
/// Describe calls return the resource kind's not-found fault when the
/// identifier does not exist. Modify calls apply immediately.
pub trait RdsBackend {
    /// Looks up a subnet group by name.
    fn describe_subnet_group<'a>(&'a self, name: &'a str) -> BackendFuture<'a, SubnetGroup>;

    /// Creates a subnet group.
    fn create_subnet_group<'a>(
        &'a self,
        spec: &'a SubnetGroupSpec,
    ) -> BackendFuture<'a, SubnetGroup>;

    /// Looks up a cluster by identifier.
    fn describe_cluster<'a>(&'a self, identifier: &'a str) -> BackendFuture<'a, Cluster>;

    /// Creates a cluster.
    fn create_cluster<'a>(&'a self, spec: &'a ClusterSpec) -> BackendFuture<'a, Cluster>;

    /// Applies an immediate modification to a cluster.
    fn modify_cluster<'a>(
        &'a self,
        modification: &'a ClusterModification,
    ) -> BackendFuture<'a, Cluster>;

    /// Looks up an instance by identifier.
    fn describe_instance<'a>(&'a self, identifier: &'a str) -> BackendFuture<'a, Instance>;

    /// Creates an instance inside a cluster.
    fn create_instance<'a>(&'a self, spec: &'a InstanceSpec) -> BackendFuture<'a, Instance>;

    /// Applies an immediate modification to an instance.
    fn modify_instance<'a>(
        &'a self,
        modification: &'a InstanceModification,
    ) -> BackendFuture<'a, Instance>;
}
