//! BDD step definitions for the provisioning workflow.

use aurora_provision::test_support::Operation;
use aurora_provision::{ProviderError, Provisioner, ReadinessOutcome, ResourceKind};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::{Builder, Runtime};

use super::test_helpers::{
    FailureStage, INSTANCE_CLASS, ProvisionContext, ProvisionFailure, ProvisionResult,
    existing_cluster, existing_instance, existing_subnet_group,
};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

fn paused_runtime() -> Result<Runtime, StepError> {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .map_err(|err| StepError::Assertion(format!("runtime: {err}")))
}

fn failure(provision_context: &ProvisionContext) -> Result<&ProvisionFailure, StepError> {
    match provision_context.outcome {
        Some(ProvisionResult::Failure(ref failure)) => Ok(failure),
        Some(ProvisionResult::Success) => Err(StepError::Assertion(String::from(
            "expected failure, provisioning succeeded",
        ))),
        None => Err(StepError::Assertion(String::from(
            "provisioning was not executed",
        ))),
    }
}

#[given("an empty RDS account")]
fn empty_account(provision_context: ProvisionContext) -> ProvisionContext {
    provision_context
}

#[given("an existing deployment running engine version \"{version}\"")]
fn existing_deployment(provision_context: ProvisionContext, version: String) -> ProvisionContext {
    let backend = provision_context
        .backend
        .clone()
        .with_subnet_group(existing_subnet_group())
        .with_cluster(existing_cluster(&version))
        .with_instance(existing_instance());
    ProvisionContext {
        backend,
        ..provision_context
    }
}

#[given("cluster creation fails with code \"{code}\"")]
fn cluster_creation_fails(provision_context: ProvisionContext, code: String) -> ProvisionContext {
    let backend = provision_context.backend.clone().failing(
        Operation::CreateCluster,
        ProviderError::coded(code, "simulated create failure"),
    );
    ProvisionContext {
        backend,
        ..provision_context
    }
}

#[given("the cluster keeps reporting \"{status}\"")]
fn cluster_never_settles(provision_context: ProvisionContext, status: String) -> ProvisionContext {
    let backend = provision_context
        .backend
        .clone()
        .with_settled_cluster_status(status);
    ProvisionContext {
        backend,
        ..provision_context
    }
}

#[given("the cluster reports \"{statuses}\"")]
fn cluster_reports(provision_context: ProvisionContext, statuses: String) -> ProvisionContext {
    let backend = provision_context
        .backend
        .clone()
        .with_cluster_statuses(statuses.split(',').map(str::trim));
    ProvisionContext {
        backend,
        ..provision_context
    }
}

#[when("I provision the deployment")]
fn provision(provision_context: ProvisionContext) -> Result<ProvisionContext, StepError> {
    let runtime = paused_runtime()?;
    let provisioner = Provisioner::new(provision_context.backend.clone());
    let request = provision_context.request.clone();
    let result = runtime.block_on(async move { provisioner.execute(&request).await });
    let outcome = match result {
        Ok(_) => ProvisionResult::Success,
        Err(err) => ProvisionResult::Failure(ProvisionFailure::from(err)),
    };
    Ok(ProvisionContext {
        outcome: Some(outcome),
        ..provision_context
    })
}

#[then("provisioning succeeds")]
fn provisioning_succeeds(provision_context: &ProvisionContext) -> Result<(), StepError> {
    match provision_context.outcome {
        Some(ProvisionResult::Success) => Ok(()),
        Some(ProvisionResult::Failure(ref failure)) => Err(StepError::Assertion(format!(
            "expected success, got: {}",
            failure.message
        ))),
        None => Err(StepError::Assertion(String::from(
            "provisioning was not executed",
        ))),
    }
}

#[then("the provider saw \"{creates}\" creates and \"{modifies}\" modifies")]
fn mutation_counts(
    provision_context: &ProvisionContext,
    creates: usize,
    modifies: usize,
) -> Result<(), StepError> {
    let backend = &provision_context.backend;
    let observed = (backend.create_count(), backend.modify_count());
    if observed != (creates, modifies) {
        return Err(StepError::Assertion(format!(
            "expected {creates} creates and {modifies} modifies, observed {observed:?}"
        )));
    }
    Ok(())
}

fn samples(provision_context: &ProvisionContext, resource: ResourceKind) -> usize {
    // The first describe of each kind is the reconciler's lookup.
    provision_context
        .backend
        .describe_count(resource)
        .saturating_sub(1)
}

#[then("each readiness wait took \"{expected}\" samples")]
fn each_wait_samples(provision_context: &ProvisionContext, expected: usize) -> Result<(), StepError> {
    for resource in [ResourceKind::Cluster, ResourceKind::Instance] {
        let observed = samples(provision_context, resource);
        if observed != expected {
            return Err(StepError::Assertion(format!(
                "{resource} wait took {observed} samples, expected {expected}"
            )));
        }
    }
    Ok(())
}

#[then("the cluster readiness wait took \"{expected}\" samples")]
fn cluster_wait_samples(
    provision_context: &ProvisionContext,
    expected: usize,
) -> Result<(), StepError> {
    let observed = samples(provision_context, ResourceKind::Cluster);
    if observed != expected {
        return Err(StepError::Assertion(format!(
            "cluster wait took {observed} samples, expected {expected}"
        )));
    }
    Ok(())
}

#[then("the cluster modification leaves the engine version unchanged")]
fn version_unchanged(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let modifications = provision_context.backend.cluster_modifications();
    let [modification] = modifications.as_slice() else {
        return Err(StepError::Assertion(format!(
            "expected one cluster modification, got {}",
            modifications.len()
        )));
    };
    if modification.engine_version.is_some() {
        return Err(StepError::Assertion(format!(
            "engine version should be omitted, got {:?}",
            modification.engine_version
        )));
    }
    if modification.master_user_password.expose() != "correct-horse" {
        return Err(StepError::Assertion(String::from(
            "password should be applied on every run",
        )));
    }
    let expected_groups = provision_context.request.security_group_ids();
    if &modification.security_group_ids != expected_groups {
        return Err(StepError::Assertion(format!(
            "security groups should be {expected_groups:?}, got {:?}",
            modification.security_group_ids
        )));
    }
    Ok(())
}

#[then("the cluster modification requests engine version \"{version}\"")]
fn version_requested(provision_context: &ProvisionContext, version: String) -> Result<(), StepError> {
    let requested: Vec<_> = provision_context
        .backend
        .cluster_modifications()
        .into_iter()
        .map(|modification| modification.engine_version)
        .collect();
    if requested != vec![Some(version.clone())] {
        return Err(StepError::Assertion(format!(
            "expected a single upgrade to {version}, got {requested:?}"
        )));
    }
    Ok(())
}

#[then("the instance modification only changes the class")]
fn instance_class_only(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let classes: Vec<_> = provision_context
        .backend
        .instance_modifications()
        .into_iter()
        .map(|modification| modification.instance_class)
        .collect();
    if classes != vec![String::from(INSTANCE_CLASS)] {
        return Err(StepError::Assertion(format!(
            "expected one class change to {INSTANCE_CLASS}, got {classes:?}"
        )));
    }
    Ok(())
}

#[then("provisioning fails at the cluster stage with code \"{code}\"")]
fn fails_at_cluster(provision_context: &ProvisionContext, code: String) -> Result<(), StepError> {
    let observed = failure(provision_context)?;
    if observed.stage != FailureStage::Cluster || observed.code.as_deref() != Some(code.as_str()) {
        return Err(StepError::Assertion(format!(
            "expected cluster failure with {code}, got {observed:?}"
        )));
    }
    Ok(())
}

#[then("the cluster is reported as not ready")]
fn cluster_not_ready(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let observed = failure(provision_context)?;
    let timed_out = matches!(observed.outcome, Some(ReadinessOutcome::TimedOut { .. }));
    if observed.stage != FailureStage::NotReady(ResourceKind::Cluster) || !timed_out {
        return Err(StepError::Assertion(format!(
            "expected cluster readiness timeout, got {observed:?}"
        )));
    }
    Ok(())
}

#[then("no instance was requested")]
fn no_instance(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let backend = &provision_context.backend;
    if !backend.instance_creations().is_empty() || backend.describe_count(ResourceKind::Instance) > 0
    {
        return Err(StepError::Assertion(String::from(
            "instance reconciliation should not have started",
        )));
    }
    Ok(())
}
