//! Provider fault classification.
//!
//! The RDS control plane reports failures through string error codes. Every
//! reconciler and the readiness poller route those codes through
//! [`classify`], which decides whether a fault is the expected "not found"
//! for the resource being operated on (the create path) or a terminal
//! failure, and attaches a short label used in log output.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

/// The three kinds of resource this crate reconciles.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ResourceKind {
    /// A DB subnet group.
    SubnetGroup,
    /// An Aurora DB cluster.
    Cluster,
    /// A DB instance that belongs to a cluster.
    Instance,
}

impl ResourceKind {
    /// Error code the provider returns when a resource of this kind does not
    /// exist.
    #[must_use]
    pub const fn not_found_code(self) -> &'static str {
        match self {
            Self::SubnetGroup => "DBSubnetGroupNotFoundFault",
            Self::Cluster => "DBClusterNotFoundFault",
            Self::Instance => "DBInstanceNotFound",
        }
    }

    /// Human readable name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubnetGroup => "subnet group",
            Self::Cluster => "cluster",
            Self::Instance => "instance",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a fault sends the caller down the create path or ends the run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FaultKind {
    /// The resource being looked up does not exist.
    NotFound,
    /// Anything else. The caller must abort.
    Terminal,
}

/// Result of classifying a provider error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fault {
    /// Recoverability of the fault.
    pub kind: FaultKind,
    /// Short description used as the log label.
    pub label: &'static str,
    /// `true` when the code matched a known provider fault.
    pub classified: bool,
}

impl Fault {
    const fn terminal(label: &'static str, classified: bool) -> Self {
        Self {
            kind: FaultKind::Terminal,
            label,
            classified,
        }
    }

    /// Returns `true` for the create-path condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, FaultKind::NotFound)
    }
}

/// Known RDS fault codes and their log labels.
///
/// Not-found codes appear here too: a `DBSubnetGroupNotFoundFault` raised by
/// `CreateDBCluster` is terminal, only the lookup of the subnet group itself
/// treats it as the create path.
const FAULT_LABELS: &[(&str, &str)] = &[
    ("DBSubnetGroupNotFoundFault", "subnet group not found"),
    ("DBClusterNotFoundFault", "cluster not found"),
    ("DBInstanceNotFound", "instance not found"),
    ("DBSubnetGroupAlreadyExists", "subnet group already exists"),
    ("DBSubnetGroupQuotaExceeded", "subnet group quota exceeded"),
    ("DBSubnetQuotaExceededFault", "subnet quota exceeded"),
    (
        "DBSubnetGroupDoesNotCoverEnoughAZs",
        "subnet group does not cover enough availability zones",
    ),
    ("InvalidSubnet", "invalid subnet"),
    ("InvalidDBSubnetGroupStateFault", "invalid subnet group state"),
    ("DBClusterAlreadyExistsFault", "cluster already exists"),
    ("DBClusterQuotaExceededFault", "cluster quota exceeded"),
    ("InvalidDBClusterStateFault", "invalid cluster state"),
    (
        "InsufficientStorageClusterCapacity",
        "insufficient cluster storage capacity",
    ),
    ("StorageQuotaExceeded", "storage quota exceeded"),
    ("InvalidVPCNetworkStateFault", "invalid VPC network state"),
    (
        "DBClusterParameterGroupNotFound",
        "cluster parameter group not found",
    ),
    ("DBParameterGroupNotFound", "parameter group not found"),
    ("InvalidDBSecurityGroupState", "invalid security group state"),
    ("DBSecurityGroupNotFound", "security group not found"),
    ("InvalidDBInstanceState", "invalid instance state"),
    ("DBInstanceAlreadyExists", "instance already exists"),
    ("InstanceQuotaExceeded", "instance quota exceeded"),
    (
        "InsufficientDBInstanceCapacity",
        "insufficient instance capacity",
    ),
    ("StorageTypeNotSupported", "storage type not supported"),
    ("OptionGroupNotFoundFault", "option group not found"),
    ("KMSKeyNotAccessibleFault", "KMS key not accessible"),
    ("DomainNotFoundFault", "directory domain not found"),
    ("DBUpgradeDependencyFailure", "upgrade dependency failure"),
    ("CertificateNotFound", "certificate not found"),
    ("AuthorizationNotFound", "authorization not found"),
];

/// Maps a provider error code to a [`Fault`] for the resource being
/// operated on.
///
/// Only the resource's own not-found code yields [`FaultKind::NotFound`].
/// Unknown codes and errors without a code are terminal and unclassified.
#[must_use]
pub fn classify(code: Option<&str>, resource: ResourceKind) -> Fault {
    let Some(code) = code else {
        return Fault::terminal("unclassified error", false);
    };

    let label = FAULT_LABELS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label);

    if code == resource.not_found_code() {
        return Fault {
            kind: FaultKind::NotFound,
            label: label.unwrap_or("not found"),
            classified: true,
        };
    }

    label.map_or_else(
        || Fault::terminal("unclassified provider fault", false),
        |known| Fault::terminal(known, true),
    )
}

/// Error returned by the RDS control plane, carrying its fault code.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message} (code: {})", .code.as_deref().unwrap_or("none"))]
pub struct ProviderError {
    /// Provider error code, when the failure came from the service.
    pub code: Option<String>,
    /// Message reported by the provider or the transport.
    pub message: String,
}

impl ProviderError {
    /// Creates an error carrying a provider fault code.
    #[must_use]
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Creates an error without a fault code (transport, auth, decoding).
    #[must_use]
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Creates the not-found fault for `resource`.
    #[must_use]
    pub fn not_found(resource: ResourceKind, identifier: &str) -> Self {
        Self::coded(
            resource.not_found_code(),
            format!("{resource} {identifier} not found"),
        )
    }

    /// Classifies this error for `resource`.
    #[must_use]
    pub fn classify(&self, resource: ResourceKind) -> Fault {
        classify(self.code.as_deref(), resource)
    }
}

/// Classifies `err` and logs it at the severity its fault kind warrants.
///
/// Not-found faults are logged at info because they trigger the create path;
/// everything else is logged at warn. The error itself is left untouched for
/// the caller to return.
pub fn report(
    err: &ProviderError,
    resource: ResourceKind,
    identifier: &str,
    operation: &str,
) -> Fault {
    let fault = err.classify(resource);
    let code = err.code.as_deref().unwrap_or("none");
    match (fault.kind, fault.classified) {
        (FaultKind::NotFound, _) => info!(
            %resource,
            identifier,
            operation,
            code,
            message = %err.message,
            "{}",
            fault.label
        ),
        (FaultKind::Terminal, true) => warn!(
            %resource,
            identifier,
            operation,
            code,
            message = %err.message,
            "{}",
            fault.label
        ),
        (FaultKind::Terminal, false) => warn!(
            %resource,
            identifier,
            operation,
            code,
            error = %err,
            "{}",
            fault.label
        ),
    }
    fault
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ResourceKind::SubnetGroup)]
    #[case(ResourceKind::Cluster)]
    #[case(ResourceKind::Instance)]
    fn own_not_found_code_is_create_path(#[case] resource: ResourceKind) {
        let fault = classify(Some(resource.not_found_code()), resource);
        assert!(fault.is_not_found(), "{resource} should be not found");
        assert!(fault.classified);
    }

    #[rstest]
    #[case("DBSubnetGroupNotFoundFault", ResourceKind::Cluster)]
    #[case("DBClusterNotFoundFault", ResourceKind::Instance)]
    #[case("DBInstanceNotFound", ResourceKind::Cluster)]
    fn foreign_not_found_code_is_terminal(#[case] code: &str, #[case] resource: ResourceKind) {
        let fault = classify(Some(code), resource);
        assert_eq!(fault.kind, FaultKind::Terminal);
        assert!(fault.classified, "{code} should still carry its label");
    }

    #[test]
    fn every_known_code_is_labelled() {
        for (code, label) in FAULT_LABELS {
            let fault = classify(Some(code), ResourceKind::Cluster);
            assert_eq!(fault.label, *label, "label for {code}");
            assert!(fault.classified);
        }
    }

    #[rstest]
    #[case(Some("ThrottlingException"))]
    #[case(Some("SomethingNew"))]
    #[case(None)]
    fn unknown_codes_are_unclassified_terminal(#[case] code: Option<&str>) {
        let fault = classify(code, ResourceKind::SubnetGroup);
        assert_eq!(fault.kind, FaultKind::Terminal);
        assert!(!fault.classified);
    }

    #[test]
    fn provider_error_renders_code() {
        let err = ProviderError::coded("InvalidSubnet", "subnet-1 is not in the VPC");
        assert_eq!(
            err.to_string(),
            "subnet-1 is not in the VPC (code: InvalidSubnet)"
        );
        assert_eq!(
            ProviderError::unclassified("dispatch failure").to_string(),
            "dispatch failure (code: none)"
        );
    }

    #[test]
    fn not_found_constructor_matches_resource() {
        let err = ProviderError::not_found(ResourceKind::Instance, "db-1");
        assert!(err.classify(ResourceKind::Instance).is_not_found());
        assert_eq!(err.message, "instance db-1 not found");
    }

    #[test]
    fn report_returns_classification() {
        let err = ProviderError::coded("StorageQuotaExceeded", "quota");
        let fault = report(&err, ResourceKind::Cluster, "c-1", "create");
        assert_eq!(fault.label, "storage quota exceeded");
        assert_eq!(fault.kind, FaultKind::Terminal);
    }
}
