//! Cluster member instance reconciliation.

use tracing::info;

use crate::backend::{Cluster, Instance, InstanceModification, InstanceSpec, RdsBackend};
use crate::fault::{ProviderError, ResourceKind};

use super::{Reconciler, absent_on_not_found, reported};

impl<B: RdsBackend + Sync> Reconciler<'_, B> {
    /// Looks up an instance, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns any provider error other than the instance not-found fault.
    pub async fn locate_instance(
        &self,
        identifier: &str,
    ) -> Result<Option<Instance>, ProviderError> {
        let found = self.backend.describe_instance(identifier).await;
        absent_on_not_found(found, ResourceKind::Instance, identifier)
    }

    /// Returns the instance, creating it inside `cluster` when absent. An
    /// existing instance is returned unmodified.
    ///
    /// # Errors
    ///
    /// Returns the provider error from the lookup or the create call.
    pub async fn ensure_instance(
        &self,
        cluster: &Cluster,
        identifier: &str,
        instance_class: &str,
    ) -> Result<Instance, ProviderError> {
        match self.locate_instance(identifier).await? {
            Some(existing) => {
                info!(
                    instance_id = %existing.identifier,
                    status = %existing.status,
                    "instance already exists"
                );
                Ok(existing)
            }
            None => {
                self.create_instance(&InstanceSpec::for_cluster(
                    cluster,
                    identifier,
                    instance_class,
                ))
                .await
            }
        }
    }

    /// Creates the instance when absent, otherwise applies an immediate
    /// modification that sets only the instance class.
    ///
    /// # Errors
    ///
    /// Returns the provider error from the lookup, create or modify call.
    pub async fn ensure_or_update_instance(
        &self,
        cluster: &Cluster,
        identifier: &str,
        instance_class: &str,
    ) -> Result<Instance, ProviderError> {
        let Some(existing) = self.locate_instance(identifier).await? else {
            return self
                .create_instance(&InstanceSpec::for_cluster(
                    cluster,
                    identifier,
                    instance_class,
                ))
                .await;
        };

        let modification = InstanceModification {
            identifier: existing.identifier.clone(),
            instance_class: instance_class.to_owned(),
        };
        info!(
            instance_id = %modification.identifier,
            current_class = %existing.instance_class,
            target_class = %modification.instance_class,
            "modifying instance"
        );
        let modified = self
            .backend
            .modify_instance(&modification)
            .await
            .map_err(|err| reported(err, ResourceKind::Instance, identifier, "modify"))?;
        info!(instance_id = %modified.identifier, status = %modified.status, "instance modified");
        Ok(modified)
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> Result<Instance, ProviderError> {
        info!(
            instance_id = %spec.identifier,
            cluster_id = %spec.cluster_identifier,
            instance_class = %spec.instance_class,
            "creating instance"
        );
        let created = self
            .backend
            .create_instance(spec)
            .await
            .map_err(|err| reported(err, ResourceKind::Instance, &spec.identifier, "create"))?;
        info!(instance_id = %created.identifier, status = %created.status, "instance created");
        Ok(created)
    }
}
