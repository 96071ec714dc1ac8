//! Idempotent find-or-create and update-or-create reconcilers.
//!
//! Each resource kind gets a locator, which turns the kind's not-found fault
//! into `Ok(None)`, and reconcilers built on top of it. Reconcilers never
//! rename or delete: they create what is absent and patch what is present.
//! Provider faults are classified and logged through [`crate::fault::report`]
//! and then returned unchanged. Nothing is retried.

mod cluster;
mod instance;
mod subnet_group;

use crate::backend::RdsBackend;
use crate::fault::{self, ProviderError, ResourceKind};

/// Reconciles subnet groups, clusters and instances against a backend.
#[derive(Debug)]
pub struct Reconciler<'a, B> {
    backend: &'a B,
}

impl<'a, B: RdsBackend + Sync> Reconciler<'a, B> {
    /// Wraps a backend.
    #[must_use]
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }
}

/// Maps the resource's not-found fault to `Ok(None)`.
fn absent_on_not_found<T>(
    found: Result<T, ProviderError>,
    resource: ResourceKind,
    identifier: &str,
) -> Result<Option<T>, ProviderError> {
    match found {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            if fault::report(&err, resource, identifier, "describe").is_not_found() {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

/// Logs a failed mutating call and hands the error back.
fn reported(
    err: ProviderError,
    resource: ResourceKind,
    identifier: &str,
    operation: &str,
) -> ProviderError {
    fault::report(&err, resource, identifier, operation);
    err
}
