//! Mapping from SDK shapes to the backend's domain types.
//!
//! The SDK marks nearly every field optional. Missing strings become empty
//! rather than failing the whole describe call.

use aws_sdk_rds::types::{DbCluster, DbInstance, DbSubnetGroup};

use crate::backend::{Cluster, Instance, SubnetGroup};

fn owned(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

pub(super) fn subnet_group(group: &DbSubnetGroup) -> SubnetGroup {
    SubnetGroup {
        name: owned(group.db_subnet_group_name()),
        description: owned(group.db_subnet_group_description()),
        subnet_ids: group
            .subnets()
            .iter()
            .filter_map(|subnet| subnet.subnet_identifier())
            .map(str::to_owned)
            .collect(),
        status: owned(group.subnet_group_status()),
    }
}

pub(super) fn cluster(cluster: &DbCluster) -> Cluster {
    Cluster {
        identifier: owned(cluster.db_cluster_identifier()),
        engine: owned(cluster.engine()),
        engine_version: owned(cluster.engine_version()),
        master_username: owned(cluster.master_username()),
        security_group_ids: cluster
            .vpc_security_groups()
            .iter()
            .filter_map(|membership| membership.vpc_security_group_id())
            .map(str::to_owned)
            .collect(),
        subnet_group: owned(cluster.db_subnet_group()),
        status: owned(cluster.status()),
    }
}

pub(super) fn instance(instance: &DbInstance) -> Instance {
    Instance {
        identifier: owned(instance.db_instance_identifier()),
        cluster_identifier: owned(instance.db_cluster_identifier()),
        engine: owned(instance.engine()),
        instance_class: owned(instance.db_instance_class()),
        status: owned(instance.db_instance_status()),
    }
}
