//! Shared fixtures for provisioning scenarios.

use std::collections::BTreeSet;

use aurora_provision::test_support::FakeRds;
use aurora_provision::{
    AVAILABLE, Cluster, ClusterRequest, Instance, ProvisionError, ReadinessOutcome, ResourceKind,
    SubnetGroup,
};
use rstest::fixture;

pub const CLUSTER_ID: &str = "orders";
pub const INSTANCE_ID: &str = "orders-1";
pub const SUBNET_GROUP: &str = "orders-subnets";
pub const ENGINE_VERSION: &str = "15.4";
pub const INSTANCE_CLASS: &str = "db.r6g.large";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FailureStage {
    SubnetGroup,
    Cluster,
    Instance,
    NotReady(ResourceKind),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProvisionFailure {
    pub stage: FailureStage,
    pub code: Option<String>,
    pub outcome: Option<ReadinessOutcome>,
    pub message: String,
}

impl From<ProvisionError> for ProvisionFailure {
    fn from(err: ProvisionError) -> Self {
        let message = err.to_string();
        match err {
            ProvisionError::SubnetGroup { source, .. } => Self {
                stage: FailureStage::SubnetGroup,
                code: source.code,
                outcome: None,
                message,
            },
            ProvisionError::Cluster { source, .. } => Self {
                stage: FailureStage::Cluster,
                code: source.code,
                outcome: None,
                message,
            },
            ProvisionError::Instance { source, .. } => Self {
                stage: FailureStage::Instance,
                code: source.code,
                outcome: None,
                message,
            },
            ProvisionError::NotReady {
                resource, outcome, ..
            } => Self {
                stage: FailureStage::NotReady(resource),
                code: None,
                outcome: Some(outcome),
                message,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub enum ProvisionResult {
    Success,
    Failure(ProvisionFailure),
}

#[derive(Clone, Debug)]
pub struct ProvisionContext {
    pub backend: FakeRds,
    pub request: ClusterRequest,
    pub outcome: Option<ProvisionResult>,
}

#[fixture]
pub fn provision_context() -> ProvisionContext {
    let request = ClusterRequest::builder()
        .region("eu-west-1")
        .cluster_id(CLUSTER_ID)
        .engine("aurora-postgresql")
        .engine_version(ENGINE_VERSION)
        .master_username("admin")
        .master_user_password("correct-horse")
        .security_group_ids(["sg-app", "sg-ops"])
        .subnet_ids(["subnet-a", "subnet-b", "subnet-c"])
        .subnet_group_name(SUBNET_GROUP)
        .subnet_group_description("orders database subnets")
        .instance_id(INSTANCE_ID)
        .instance_class(INSTANCE_CLASS)
        .ready_timeout_minutes(2)
        .build()
        .unwrap_or_else(|err| panic!("fixture request should build: {err}"));

    ProvisionContext {
        backend: FakeRds::new(),
        request,
        outcome: None,
    }
}

pub fn existing_subnet_group() -> SubnetGroup {
    SubnetGroup {
        name: String::from(SUBNET_GROUP),
        description: String::from("orders database subnets"),
        subnet_ids: vec![
            String::from("subnet-a"),
            String::from("subnet-b"),
            String::from("subnet-c"),
        ],
        status: String::from("Complete"),
    }
}

pub fn existing_cluster(engine_version: &str) -> Cluster {
    Cluster {
        identifier: String::from(CLUSTER_ID),
        engine: String::from("aurora-postgresql"),
        engine_version: engine_version.to_owned(),
        master_username: String::from("admin"),
        security_group_ids: BTreeSet::from([String::from("sg-legacy")]),
        subnet_group: String::from(SUBNET_GROUP),
        status: String::from(AVAILABLE),
    }
}

pub fn existing_instance() -> Instance {
    Instance {
        identifier: String::from(INSTANCE_ID),
        cluster_identifier: String::from(CLUSTER_ID),
        engine: String::from("aurora-postgresql"),
        instance_class: String::from("db.r5.large"),
        status: String::from(AVAILABLE),
    }
}
