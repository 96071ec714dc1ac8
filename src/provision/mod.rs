//! Orchestrates a full reconciliation run.
//!
//! The run ensures the subnet group, reconciles the cluster, waits for it to
//! settle, reconciles the primary instance inside the ready cluster and
//! waits for that too. Steps run strictly in order and the first failure
//! aborts the rest. Nothing created earlier in the run is rolled back.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::backend::{Cluster, Instance, RdsBackend, SubnetGroup};
use crate::fault::{ProviderError, ResourceKind};
use crate::readiness::{ReadinessOutcome, ReadinessPoller};
use crate::reconcile::Reconciler;
use crate::request::ClusterRequest;

/// Errors surfaced while provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Raised when the subnet group cannot be found or created.
    #[error("failed to ensure subnet group {name}: {source}")]
    SubnetGroup {
        /// Subnet group name.
        name: String,
        /// Provider fault.
        #[source]
        source: ProviderError,
    },
    /// Raised when the cluster cannot be found, created or modified.
    #[error("failed to reconcile cluster {identifier}: {source}")]
    Cluster {
        /// Cluster identifier.
        identifier: String,
        /// Provider fault.
        #[source]
        source: ProviderError,
    },
    /// Raised when the instance cannot be found, created or modified.
    #[error("failed to reconcile instance {identifier}: {source}")]
    Instance {
        /// Instance identifier.
        identifier: String,
        /// Provider fault.
        #[source]
        source: ProviderError,
    },
    /// Raised when a resource is not confirmed ready.
    #[error("{resource} {identifier} was not confirmed ready: {outcome}")]
    NotReady {
        /// Kind of resource that was awaited.
        resource: ResourceKind,
        /// Identifier of the awaited resource.
        identifier: String,
        /// How the wait ended.
        outcome: ReadinessOutcome,
    },
}

/// Resources as they stood at the end of a successful run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Provisioned {
    /// Subnet group the cluster lives in.
    pub subnet_group: SubnetGroup,
    /// Cluster as returned by the create or modify call.
    pub cluster: Cluster,
    /// Instance as returned by the create or modify call.
    pub instance: Instance,
}

/// Runs subnet group, cluster and instance reconciliation in sequence.
#[derive(Debug)]
pub struct Provisioner<B> {
    backend: B,
    poller: ReadinessPoller,
    cancel: CancellationToken,
}

impl<B> Provisioner<B>
where
    B: RdsBackend + Sync,
{
    /// Creates a provisioner with the default poller and a token that is
    /// never cancelled.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            poller: ReadinessPoller::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Overrides the readiness poller.
    #[must_use]
    pub const fn with_poller(mut self, poller: ReadinessPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Uses `cancel` to interrupt readiness waits.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Backend the provisioner drives.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs the full sequence for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] for the first step that fails. Each wait
    /// phase gets its own deadline of `request.ready_timeout()`.
    pub async fn execute(&self, request: &ClusterRequest) -> Result<Provisioned, ProvisionError> {
        let reconciler = Reconciler::new(&self.backend);

        let subnet_group = reconciler
            .ensure_subnet_group(&request.subnet_group_spec())
            .await
            .map_err(|source| ProvisionError::SubnetGroup {
                name: request.subnet_group_name().to_owned(),
                source,
            })?;

        let cluster = reconciler
            .ensure_or_update_cluster(&request.cluster_spec(&subnet_group.name))
            .await
            .map_err(|source| ProvisionError::Cluster {
                identifier: request.cluster_id().to_owned(),
                source,
            })?;
        self.await_cluster(request, &cluster.identifier).await?;

        let instance = reconciler
            .ensure_or_update_instance(&cluster, request.instance_id(), request.instance_class())
            .await
            .map_err(|source| ProvisionError::Instance {
                identifier: request.instance_id().to_owned(),
                source,
            })?;
        self.await_instance(request, &instance.identifier).await?;

        info!(
            cluster_id = %cluster.identifier,
            instance_id = %instance.identifier,
            subnet_group = %subnet_group.name,
            "success"
        );
        Ok(Provisioned {
            subnet_group,
            cluster,
            instance,
        })
    }

    async fn await_cluster(
        &self,
        request: &ClusterRequest,
        identifier: &str,
    ) -> Result<(), ProvisionError> {
        let backend = &self.backend;
        let outcome = self
            .poller
            .wait_until_available(
                ResourceKind::Cluster,
                identifier,
                request.ready_timeout(),
                &self.cancel,
                move || async move {
                    backend
                        .describe_cluster(identifier)
                        .await
                        .map(|cluster| cluster.status)
                },
            )
            .await;
        ready_or_error(ResourceKind::Cluster, identifier, outcome)
    }

    async fn await_instance(
        &self,
        request: &ClusterRequest,
        identifier: &str,
    ) -> Result<(), ProvisionError> {
        let backend = &self.backend;
        let outcome = self
            .poller
            .wait_until_available(
                ResourceKind::Instance,
                identifier,
                request.ready_timeout(),
                &self.cancel,
                move || async move {
                    backend
                        .describe_instance(identifier)
                        .await
                        .map(|instance| instance.status)
                },
            )
            .await;
        ready_or_error(ResourceKind::Instance, identifier, outcome)
    }
}

fn ready_or_error(
    resource: ResourceKind,
    identifier: &str,
    outcome: ReadinessOutcome,
) -> Result<(), ProvisionError> {
    if outcome.is_ready() {
        return Ok(());
    }
    Err(ProvisionError::NotReady {
        resource,
        identifier: identifier.to_owned(),
        outcome,
    })
}
