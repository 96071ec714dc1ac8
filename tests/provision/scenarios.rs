//! BDD scenarios for the provisioning workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{ProvisionContext, provision_context};

#[scenario(
    path = "tests/features/provision.feature",
    name = "Provision into an empty account"
)]
fn scenario_empty_account(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Reconcile an existing deployment at the requested version"
)]
fn scenario_existing_same_version(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Upgrade an existing cluster to the requested version"
)]
fn scenario_version_upgrade(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Stop when cluster creation fails"
)]
fn scenario_cluster_create_failure(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Give up when the cluster never settles"
)]
fn scenario_cluster_never_ready(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Debounce a flapping cluster"
)]
fn scenario_flapping_cluster(provision_context: ProvisionContext) {
    drop(provision_context);
}
