//! Core library for the `aurora-provision` tool.
//!
//! The crate reconciles an RDS Aurora deployment made of a DB subnet group,
//! a DB cluster and the cluster's primary instance. Each resource is looked
//! up by identifier and created when absent or patched when present, then
//! polled until it reports `available` for several consecutive samples.
//! All provider access goes through the [`RdsBackend`] trait so the
//! reconcilers can be driven against [`test_support::FakeRds`] in tests and
//! [`AwsRdsBackend`] in production.

pub mod backend;
pub mod config;
pub mod fault;
pub mod provision;
pub mod rds;
pub mod readiness;
pub mod reconcile;
pub mod request;
pub mod test_support;

pub use backend::{
    AVAILABLE, Cluster, ClusterModification, ClusterSpec, Instance, InstanceModification,
    InstanceSpec, MasterPassword, RdsBackend, SubnetGroup, SubnetGroupSpec,
};
pub use config::{ConfigError, ReadinessConfig};
pub use fault::{Fault, FaultKind, ProviderError, ResourceKind, classify};
pub use provision::{ProvisionError, Provisioned, Provisioner};
pub use rds::AwsRdsBackend;
pub use readiness::{
    DEFAULT_POLL_INTERVAL, DEFAULT_REQUIRED_CONFIRMATIONS, ReadinessOutcome, ReadinessPoller,
};
pub use reconcile::Reconciler;
pub use request::{
    ClusterRequest, ClusterRequestBuilder, DEFAULT_READY_TIMEOUT_MINUTES, RequestError,
    parse_ready_timeout, split_list,
};
