//! Cluster reconciliation.

use tracing::info;

use crate::backend::{Cluster, ClusterModification, ClusterSpec, RdsBackend};
use crate::fault::{ProviderError, ResourceKind};

use super::{Reconciler, absent_on_not_found, reported};

impl<B: RdsBackend + Sync> Reconciler<'_, B> {
    /// Looks up a cluster, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns any provider error other than the cluster not-found fault.
    pub async fn locate_cluster(&self, identifier: &str) -> Result<Option<Cluster>, ProviderError> {
        let found = self.backend.describe_cluster(identifier).await;
        absent_on_not_found(found, ResourceKind::Cluster, identifier)
    }

    /// Returns the cluster, creating it when absent. An existing cluster is
    /// returned unmodified.
    ///
    /// # Errors
    ///
    /// Returns the provider error from the lookup or the create call.
    pub async fn ensure_cluster(&self, spec: &ClusterSpec) -> Result<Cluster, ProviderError> {
        match self.locate_cluster(&spec.identifier).await? {
            Some(existing) => {
                info!(
                    cluster_id = %existing.identifier,
                    status = %existing.status,
                    "cluster already exists"
                );
                Ok(existing)
            }
            None => self.create_cluster(spec).await,
        }
    }

    /// Creates the cluster when absent, otherwise applies an immediate
    /// modification towards `spec`.
    ///
    /// A freshly created cluster is returned without any modify call. An
    /// existing cluster always receives the password and security groups,
    /// and the engine version only when it differs.
    ///
    /// # Errors
    ///
    /// Returns the provider error from the lookup, create or modify call.
    pub async fn ensure_or_update_cluster(
        &self,
        spec: &ClusterSpec,
    ) -> Result<Cluster, ProviderError> {
        let Some(existing) = self.locate_cluster(&spec.identifier).await? else {
            return self.create_cluster(spec).await;
        };

        let modification = ClusterModification::between(&existing, spec);
        info!(
            cluster_id = %modification.identifier,
            running_version = %existing.engine_version,
            target_version = modification.engine_version.as_deref().unwrap_or("unchanged"),
            security_groups = modification.security_group_ids.len(),
            "modifying cluster"
        );
        let modified = self
            .backend
            .modify_cluster(&modification)
            .await
            .map_err(|err| reported(err, ResourceKind::Cluster, &spec.identifier, "modify"))?;
        info!(cluster_id = %modified.identifier, status = %modified.status, "cluster modified");
        Ok(modified)
    }

    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<Cluster, ProviderError> {
        info!(
            cluster_id = %spec.identifier,
            engine = %spec.engine,
            engine_version = %spec.engine_version,
            subnet_group = %spec.subnet_group_name,
            "creating cluster"
        );
        let created = self
            .backend
            .create_cluster(spec)
            .await
            .map_err(|err| reported(err, ResourceKind::Cluster, &spec.identifier, "create"))?;
        info!(cluster_id = %created.identifier, status = %created.status, "cluster created");
        Ok(created)
    }
}
