//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

use crate::backend::{
    AVAILABLE, BackendFuture, Cluster, ClusterModification, ClusterSpec, Instance,
    InstanceModification, InstanceSpec, RdsBackend, SubnetGroup, SubnetGroupSpec,
};
use crate::fault::{ProviderError, ResourceKind};

/// Status a subnet group reports once it exists.
pub const SUBNET_GROUP_COMPLETE: &str = "Complete";

/// Backend operations a [`FakeRds`] can be told to fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    /// `describe_subnet_group`.
    DescribeSubnetGroup,
    /// `create_subnet_group`.
    CreateSubnetGroup,
    /// `describe_cluster`.
    DescribeCluster,
    /// `create_cluster`.
    CreateCluster,
    /// `modify_cluster`.
    ModifyCluster,
    /// `describe_instance`.
    DescribeInstance,
    /// `create_instance`.
    CreateInstance,
    /// `modify_instance`.
    ModifyInstance,
}

/// A call recorded by [`FakeRds`], with the arguments it received.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    /// Subnet group lookup by name.
    DescribeSubnetGroup(String),
    /// Subnet group creation.
    CreateSubnetGroup(SubnetGroupSpec),
    /// Cluster lookup by identifier.
    DescribeCluster(String),
    /// Cluster creation.
    CreateCluster(ClusterSpec),
    /// Cluster modification.
    ModifyCluster(ClusterModification),
    /// Instance lookup by identifier.
    DescribeInstance(String),
    /// Instance creation.
    CreateInstance(InstanceSpec),
    /// Instance modification.
    ModifyInstance(InstanceModification),
}

impl Call {
    /// Returns `true` for create and modify calls.
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::DescribeSubnetGroup(_) | Self::DescribeCluster(_) | Self::DescribeInstance(_)
        )
    }
}

#[derive(Debug)]
struct StatusScript {
    queued: VecDeque<String>,
    settled: String,
}

impl Default for StatusScript {
    fn default() -> Self {
        Self {
            queued: VecDeque::new(),
            settled: String::from(AVAILABLE),
        }
    }
}

impl StatusScript {
    fn next(&mut self) -> String {
        self.queued
            .pop_front()
            .unwrap_or_else(|| self.settled.clone())
    }
}

#[derive(Debug, Default)]
struct FakeState {
    subnet_groups: BTreeMap<String, SubnetGroup>,
    clusters: BTreeMap<String, Cluster>,
    instances: BTreeMap<String, Instance>,
    cluster_statuses: StatusScript,
    instance_statuses: StatusScript,
    failures: HashMap<Operation, ProviderError>,
    calls: Vec<Call>,
}

/// In-memory RDS control plane with scripted statuses and recorded calls.
///
/// Describing an existing cluster or instance reports the next scripted
/// status for that kind, or `available` once the script is exhausted.
/// Describing an absent resource returns its not-found fault. Clones share
/// state, so a test can keep a handle while the code under test owns another.
#[derive(Clone, Debug, Default)]
pub struct FakeRds {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRds {
    /// Creates an empty control plane.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Seeds an existing subnet group.
    #[must_use]
    pub fn with_subnet_group(self, group: SubnetGroup) -> Self {
        self.with_state(|state| state.subnet_groups.insert(group.name.clone(), group));
        self
    }

    /// Seeds an existing cluster.
    #[must_use]
    pub fn with_cluster(self, cluster: Cluster) -> Self {
        self.with_state(|state| state.clusters.insert(cluster.identifier.clone(), cluster));
        self
    }

    /// Seeds an existing instance.
    #[must_use]
    pub fn with_instance(self, instance: Instance) -> Self {
        self.with_state(|state| {
            state
                .instances
                .insert(instance.identifier.clone(), instance)
        });
        self
    }

    /// Queues statuses reported by successive cluster describes.
    #[must_use]
    pub fn with_cluster_statuses<I, S>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_state(|state| {
            state
                .cluster_statuses
                .queued
                .extend(statuses.into_iter().map(Into::into));
        });
        self
    }

    /// Queues statuses reported by successive instance describes.
    #[must_use]
    pub fn with_instance_statuses<I, S>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_state(|state| {
            state
                .instance_statuses
                .queued
                .extend(statuses.into_iter().map(Into::into));
        });
        self
    }

    /// Status clusters report once their script is exhausted.
    #[must_use]
    pub fn with_settled_cluster_status(self, status: impl Into<String>) -> Self {
        let settled = status.into();
        self.with_state(|state| state.cluster_statuses.settled = settled);
        self
    }

    /// Makes every call to `operation` fail with `err`.
    #[must_use]
    pub fn failing(self, operation: Operation, err: ProviderError) -> Self {
        self.with_state(|state| state.failures.insert(operation, err));
        self
    }

    /// Snapshot of every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|state| state.calls.clone())
    }

    /// Number of create calls across all resource kinds.
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                Call::CreateSubnetGroup(_) | Call::CreateCluster(_) | Call::CreateInstance(_)
            )
        })
    }

    /// Number of modify calls across all resource kinds.
    #[must_use]
    pub fn modify_count(&self) -> usize {
        self.count(|call| matches!(call, Call::ModifyCluster(_) | Call::ModifyInstance(_)))
    }

    /// Number of create and modify calls.
    #[must_use]
    pub fn mutating_count(&self) -> usize {
        self.count(Call::is_mutating)
    }

    /// Number of describe calls for `resource`.
    #[must_use]
    pub fn describe_count(&self, resource: ResourceKind) -> usize {
        self.count(|call| {
            matches!(
                (resource, call),
                (ResourceKind::SubnetGroup, Call::DescribeSubnetGroup(_))
                    | (ResourceKind::Cluster, Call::DescribeCluster(_))
                    | (ResourceKind::Instance, Call::DescribeInstance(_))
            )
        })
    }

    /// Subnet groups passed to create, in call order.
    #[must_use]
    pub fn subnet_group_creations(&self) -> Vec<SubnetGroupSpec> {
        self.collect(|call| match call {
            Call::CreateSubnetGroup(spec) => Some(spec.clone()),
            _ => None,
        })
    }

    /// Clusters passed to create, in call order.
    #[must_use]
    pub fn cluster_creations(&self) -> Vec<ClusterSpec> {
        self.collect(|call| match call {
            Call::CreateCluster(spec) => Some(spec.clone()),
            _ => None,
        })
    }

    /// Instances passed to create, in call order.
    #[must_use]
    pub fn instance_creations(&self) -> Vec<InstanceSpec> {
        self.collect(|call| match call {
            Call::CreateInstance(spec) => Some(spec.clone()),
            _ => None,
        })
    }

    /// Cluster modifications, in call order.
    #[must_use]
    pub fn cluster_modifications(&self) -> Vec<ClusterModification> {
        self.collect(|call| match call {
            Call::ModifyCluster(modification) => Some(modification.clone()),
            _ => None,
        })
    }

    /// Instance modifications, in call order.
    #[must_use]
    pub fn instance_modifications(&self) -> Vec<InstanceModification> {
        self.collect(|call| match call {
            Call::ModifyInstance(modification) => Some(modification.clone()),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.with_state(|state| state.calls.iter().filter(|call| predicate(call)).count())
    }

    fn collect<T>(&self, select: impl Fn(&Call) -> Option<T>) -> Vec<T> {
        self.with_state(|state| state.calls.iter().filter_map(select).collect())
    }

    fn record<T>(
        &self,
        call: Call,
        operation: Operation,
        apply: impl FnOnce(&mut FakeState) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        self.with_state(|state| {
            state.calls.push(call);
            match state.failures.get(&operation) {
                Some(err) => Err(err.clone()),
                None => apply(state),
            }
        })
    }
}

impl RdsBackend for FakeRds {
    fn describe_subnet_group<'a>(&'a self, name: &'a str) -> BackendFuture<'a, SubnetGroup> {
        Box::pin(async move {
            self.record(
                Call::DescribeSubnetGroup(name.to_owned()),
                Operation::DescribeSubnetGroup,
                |state| {
                    state
                        .subnet_groups
                        .get(name)
                        .cloned()
                        .ok_or_else(|| ProviderError::not_found(ResourceKind::SubnetGroup, name))
                },
            )
        })
    }

    fn create_subnet_group<'a>(
        &'a self,
        spec: &'a SubnetGroupSpec,
    ) -> BackendFuture<'a, SubnetGroup> {
        Box::pin(async move {
            self.record(
                Call::CreateSubnetGroup(spec.clone()),
                Operation::CreateSubnetGroup,
                |state| {
                    if state.subnet_groups.contains_key(&spec.name) {
                        return Err(ProviderError::coded(
                            "DBSubnetGroupAlreadyExists",
                            format!("subnet group {} already exists", spec.name),
                        ));
                    }
                    let group = SubnetGroup {
                        name: spec.name.clone(),
                        description: spec.description.clone(),
                        subnet_ids: spec.subnet_ids.clone(),
                        status: String::from(SUBNET_GROUP_COMPLETE),
                    };
                    state.subnet_groups.insert(group.name.clone(), group.clone());
                    Ok(group)
                },
            )
        })
    }

    fn describe_cluster<'a>(&'a self, identifier: &'a str) -> BackendFuture<'a, Cluster> {
        Box::pin(async move {
            self.record(
                Call::DescribeCluster(identifier.to_owned()),
                Operation::DescribeCluster,
                |state| {
                    if !state.clusters.contains_key(identifier) {
                        return Err(ProviderError::not_found(ResourceKind::Cluster, identifier));
                    }
                    let status = state.cluster_statuses.next();
                    let cluster = state.clusters.get_mut(identifier).ok_or_else(|| {
                        ProviderError::not_found(ResourceKind::Cluster, identifier)
                    })?;
                    cluster.status = status;
                    Ok(cluster.clone())
                },
            )
        })
    }

    fn create_cluster<'a>(&'a self, spec: &'a ClusterSpec) -> BackendFuture<'a, Cluster> {
        Box::pin(async move {
            self.record(
                Call::CreateCluster(spec.clone()),
                Operation::CreateCluster,
                |state| {
                    if state.clusters.contains_key(&spec.identifier) {
                        return Err(ProviderError::coded(
                            "DBClusterAlreadyExistsFault",
                            format!("cluster {} already exists", spec.identifier),
                        ));
                    }
                    if !state.subnet_groups.contains_key(&spec.subnet_group_name) {
                        return Err(ProviderError::not_found(
                            ResourceKind::SubnetGroup,
                            &spec.subnet_group_name,
                        ));
                    }
                    let cluster = Cluster {
                        identifier: spec.identifier.clone(),
                        engine: spec.engine.clone(),
                        engine_version: spec.engine_version.clone(),
                        master_username: spec.master_username.clone(),
                        security_group_ids: spec.security_group_ids.clone(),
                        subnet_group: spec.subnet_group_name.clone(),
                        status: String::from("creating"),
                    };
                    state
                        .clusters
                        .insert(cluster.identifier.clone(), cluster.clone());
                    Ok(cluster)
                },
            )
        })
    }

    fn modify_cluster<'a>(
        &'a self,
        modification: &'a ClusterModification,
    ) -> BackendFuture<'a, Cluster> {
        Box::pin(async move {
            self.record(
                Call::ModifyCluster(modification.clone()),
                Operation::ModifyCluster,
                |state| {
                    let cluster = state
                        .clusters
                        .get_mut(&modification.identifier)
                        .ok_or_else(|| {
                            ProviderError::not_found(ResourceKind::Cluster, &modification.identifier)
                        })?;
                    cluster
                        .security_group_ids
                        .clone_from(&modification.security_group_ids);
                    if let Some(version) = &modification.engine_version {
                        cluster.engine_version.clone_from(version);
                    }
                    cluster.status = String::from("modifying");
                    Ok(cluster.clone())
                },
            )
        })
    }

    fn describe_instance<'a>(&'a self, identifier: &'a str) -> BackendFuture<'a, Instance> {
        Box::pin(async move {
            self.record(
                Call::DescribeInstance(identifier.to_owned()),
                Operation::DescribeInstance,
                |state| {
                    if !state.instances.contains_key(identifier) {
                        return Err(ProviderError::not_found(ResourceKind::Instance, identifier));
                    }
                    let status = state.instance_statuses.next();
                    let instance = state.instances.get_mut(identifier).ok_or_else(|| {
                        ProviderError::not_found(ResourceKind::Instance, identifier)
                    })?;
                    instance.status = status;
                    Ok(instance.clone())
                },
            )
        })
    }

    fn create_instance<'a>(&'a self, spec: &'a InstanceSpec) -> BackendFuture<'a, Instance> {
        Box::pin(async move {
            self.record(
                Call::CreateInstance(spec.clone()),
                Operation::CreateInstance,
                |state| {
                    if state.instances.contains_key(&spec.identifier) {
                        return Err(ProviderError::coded(
                            "DBInstanceAlreadyExists",
                            format!("instance {} already exists", spec.identifier),
                        ));
                    }
                    if !state.clusters.contains_key(&spec.cluster_identifier) {
                        return Err(ProviderError::not_found(
                            ResourceKind::Cluster,
                            &spec.cluster_identifier,
                        ));
                    }
                    let instance = Instance {
                        identifier: spec.identifier.clone(),
                        cluster_identifier: spec.cluster_identifier.clone(),
                        engine: spec.engine.clone(),
                        instance_class: spec.instance_class.clone(),
                        status: String::from("creating"),
                    };
                    state
                        .instances
                        .insert(instance.identifier.clone(), instance.clone());
                    Ok(instance)
                },
            )
        })
    }

    fn modify_instance<'a>(
        &'a self,
        modification: &'a InstanceModification,
    ) -> BackendFuture<'a, Instance> {
        Box::pin(async move {
            self.record(
                Call::ModifyInstance(modification.clone()),
                Operation::ModifyInstance,
                |state| {
                    let instance = state
                        .instances
                        .get_mut(&modification.identifier)
                        .ok_or_else(|| {
                            ProviderError::not_found(
                                ResourceKind::Instance,
                                &modification.identifier,
                            )
                        })?;
                    instance
                        .instance_class
                        .clone_from(&modification.instance_class);
                    instance.status = String::from("modifying");
                    Ok(instance.clone())
                },
            )
        })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
