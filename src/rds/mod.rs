//! RDS backend implemented on top of the AWS SDK.

mod convert;
mod error;

use std::fmt;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_rds::Client;
use tracing::debug;

use crate::backend::{
    BackendFuture, Cluster, ClusterModification, ClusterSpec, Instance, InstanceModification,
    InstanceSpec, RdsBackend, SubnetGroup, SubnetGroupSpec,
};
use crate::fault::{ProviderError, ResourceKind};

/// Production [`RdsBackend`] talking to the RDS control plane.
#[derive(Clone)]
pub struct AwsRdsBackend {
    client: Client,
    region: String,
}

impl fmt::Debug for AwsRdsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsRdsBackend")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsRdsBackend {
    /// Loads credentials through the default provider chain for `region`,
    /// optionally pinned to a shared-config `profile`.
    pub async fn connect(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_owned()));
        if let Some(name) = profile {
            loader = loader.profile_name(name);
        }
        let config = loader.load().await;
        debug!(region, profile = profile.unwrap_or("default"), "loaded AWS configuration");
        Self::from_client(Client::new(&config), region)
    }

    /// Wraps an existing SDK client.
    #[must_use]
    pub fn from_client(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// Region the client is bound to.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }
}

fn missing(resource: ResourceKind, identifier: &str, operation: &str) -> ProviderError {
    ProviderError::unclassified(format!(
        "{operation} for {resource} {identifier} returned no {resource}"
    ))
}

impl RdsBackend for AwsRdsBackend {
    fn describe_subnet_group<'a>(&'a self, name: &'a str) -> BackendFuture<'a, SubnetGroup> {
        Box::pin(async move {
            let output = self
                .client
                .describe_db_subnet_groups()
                .db_subnet_group_name(name)
                .send()
                .await?;
            output
                .db_subnet_groups()
                .first()
                .map(convert::subnet_group)
                .ok_or_else(|| ProviderError::not_found(ResourceKind::SubnetGroup, name))
        })
    }

    fn create_subnet_group<'a>(
        &'a self,
        spec: &'a SubnetGroupSpec,
    ) -> BackendFuture<'a, SubnetGroup> {
        Box::pin(async move {
            let output = self
                .client
                .create_db_subnet_group()
                .db_subnet_group_name(&spec.name)
                .db_subnet_group_description(&spec.description)
                .set_subnet_ids(Some(spec.subnet_ids.clone()))
                .send()
                .await?;
            output
                .db_subnet_group()
                .map(convert::subnet_group)
                .ok_or_else(|| missing(ResourceKind::SubnetGroup, &spec.name, "create"))
        })
    }

    fn describe_cluster<'a>(&'a self, identifier: &'a str) -> BackendFuture<'a, Cluster> {
        Box::pin(async move {
            let output = self
                .client
                .describe_db_clusters()
                .db_cluster_identifier(identifier)
                .send()
                .await?;
            output
                .db_clusters()
                .first()
                .map(convert::cluster)
                .ok_or_else(|| ProviderError::not_found(ResourceKind::Cluster, identifier))
        })
    }

    fn create_cluster<'a>(&'a self, spec: &'a ClusterSpec) -> BackendFuture<'a, Cluster> {
        Box::pin(async move {
            let output = self
                .client
                .create_db_cluster()
                .db_cluster_identifier(&spec.identifier)
                .engine(&spec.engine)
                .engine_version(&spec.engine_version)
                .master_username(&spec.master_username)
                .master_user_password(spec.master_user_password.expose())
                .set_vpc_security_group_ids(Some(
                    spec.security_group_ids.iter().cloned().collect(),
                ))
                .db_subnet_group_name(&spec.subnet_group_name)
                .send()
                .await?;
            output
                .db_cluster()
                .map(convert::cluster)
                .ok_or_else(|| missing(ResourceKind::Cluster, &spec.identifier, "create"))
        })
    }

    fn modify_cluster<'a>(
        &'a self,
        modification: &'a ClusterModification,
    ) -> BackendFuture<'a, Cluster> {
        Box::pin(async move {
            let output = self
                .client
                .modify_db_cluster()
                .db_cluster_identifier(&modification.identifier)
                .master_user_password(modification.master_user_password.expose())
                .set_vpc_security_group_ids(Some(
                    modification.security_group_ids.iter().cloned().collect(),
                ))
                .set_engine_version(modification.engine_version.clone())
                .apply_immediately(true)
                .send()
                .await?;
            output
                .db_cluster()
                .map(convert::cluster)
                .ok_or_else(|| missing(ResourceKind::Cluster, &modification.identifier, "modify"))
        })
    }

    fn describe_instance<'a>(&'a self, identifier: &'a str) -> BackendFuture<'a, Instance> {
        Box::pin(async move {
            let output = self
                .client
                .describe_db_instances()
                .db_instance_identifier(identifier)
                .send()
                .await?;
            output
                .db_instances()
                .first()
                .map(convert::instance)
                .ok_or_else(|| ProviderError::not_found(ResourceKind::Instance, identifier))
        })
    }

    fn create_instance<'a>(&'a self, spec: &'a InstanceSpec) -> BackendFuture<'a, Instance> {
        Box::pin(async move {
            let output = self
                .client
                .create_db_instance()
                .db_instance_identifier(&spec.identifier)
                .db_cluster_identifier(&spec.cluster_identifier)
                .engine(&spec.engine)
                .db_instance_class(&spec.instance_class)
                .send()
                .await?;
            output
                .db_instance()
                .map(convert::instance)
                .ok_or_else(|| missing(ResourceKind::Instance, &spec.identifier, "create"))
        })
    }

    fn modify_instance<'a>(
        &'a self,
        modification: &'a InstanceModification,
    ) -> BackendFuture<'a, Instance> {
        Box::pin(async move {
            let output = self
                .client
                .modify_db_instance()
                .db_instance_identifier(&modification.identifier)
                .db_instance_class(&modification.instance_class)
                .apply_immediately(true)
                .send()
                .await?;
            output
                .db_instance()
                .map(convert::instance)
                .ok_or_else(|| missing(ResourceKind::Instance, &modification.identifier, "modify"))
        })
    }
}
