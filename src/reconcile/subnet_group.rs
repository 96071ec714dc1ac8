//! Subnet group reconciliation.

use tracing::info;

use crate::backend::{RdsBackend, SubnetGroup, SubnetGroupSpec};
use crate::fault::{ProviderError, ResourceKind};

use super::{Reconciler, absent_on_not_found, reported};

impl<B: RdsBackend + Sync> Reconciler<'_, B> {
    /// Looks up a subnet group, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns any provider error other than the subnet group not-found
    /// fault.
    pub async fn locate_subnet_group(
        &self,
        name: &str,
    ) -> Result<Option<SubnetGroup>, ProviderError> {
        let found = self.backend.describe_subnet_group(name).await;
        absent_on_not_found(found, ResourceKind::SubnetGroup, name)
    }

    /// Returns the named subnet group, creating it when absent.
    ///
    /// An existing group is returned as-is even if its description or
    /// subnets differ from `spec`.
    ///
    /// # Errors
    ///
    /// Returns the provider error from the lookup or the create call.
    pub async fn ensure_subnet_group(
        &self,
        spec: &SubnetGroupSpec,
    ) -> Result<SubnetGroup, ProviderError> {
        if let Some(existing) = self.locate_subnet_group(&spec.name).await? {
            info!(
                subnet_group = %existing.name,
                status = %existing.status,
                "subnet group already exists"
            );
            return Ok(existing);
        }

        info!(
            subnet_group = %spec.name,
            subnets = spec.subnet_ids.len(),
            "creating subnet group"
        );
        let created = self
            .backend
            .create_subnet_group(spec)
            .await
            .map_err(|err| reported(err, ResourceKind::SubnetGroup, &spec.name, "create"))?;
        info!(subnet_group = %created.name, status = %created.status, "subnet group created");
        Ok(created)
    }
}
