//! The immutable request consumed by the reconcilers.
//!
//! A [`ClusterRequest`] is built once per run through
//! [`ClusterRequestBuilder`], which trims every input and validates required
//! fields on [`ClusterRequestBuilder::build`]. After that the value is only
//! read.

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::backend::{ClusterSpec, MasterPassword, SubnetGroupSpec};

pub mod env;

/// Ready timeout applied when the configured value is missing or unusable.
pub const DEFAULT_READY_TIMEOUT_MINUTES: u64 = 1;

const SECONDS_PER_MINUTE: u64 = 60;

/// Errors raised while building a [`ClusterRequest`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Raised when a required field is missing or blank.
    #[error("missing or empty field: {0}")]
    MissingField(String),
}

/// Everything one reconciliation run needs, fixed for the run's duration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusterRequest {
    region: String,
    profile: Option<String>,
    cluster_id: String,
    engine: String,
    engine_version: String,
    master_username: String,
    master_user_password: MasterPassword,
    security_group_ids: BTreeSet<String>,
    subnet_ids: Vec<String>,
    subnet_group_name: String,
    subnet_group_description: String,
    instance_id: String,
    instance_class: String,
    ready_timeout_minutes: u64,
}

impl ClusterRequest {
    /// Starts a builder for a [`ClusterRequest`].
    #[must_use]
    pub fn builder() -> ClusterRequestBuilder {
        ClusterRequestBuilder::new()
    }

    /// AWS region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Shared-config profile, if one was given.
    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Cluster identifier.
    #[must_use]
    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    /// Database engine.
    #[must_use]
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Requested engine version.
    #[must_use]
    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }

    /// Master user name.
    #[must_use]
    pub fn master_username(&self) -> &str {
        &self.master_username
    }

    /// Master password.
    #[must_use]
    pub const fn master_user_password(&self) -> &MasterPassword {
        &self.master_user_password
    }

    /// Security groups, deduplicated and order independent.
    #[must_use]
    pub const fn security_group_ids(&self) -> &BTreeSet<String> {
        &self.security_group_ids
    }

    /// Subnets in the order they were configured.
    #[must_use]
    pub fn subnet_ids(&self) -> &[String] {
        &self.subnet_ids
    }

    /// Subnet group name.
    #[must_use]
    pub fn subnet_group_name(&self) -> &str {
        &self.subnet_group_name
    }

    /// Subnet group description.
    #[must_use]
    pub fn subnet_group_description(&self) -> &str {
        &self.subnet_group_description
    }

    /// Instance identifier.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Instance class.
    #[must_use]
    pub fn instance_class(&self) -> &str {
        &self.instance_class
    }

    /// Ready timeout in minutes.
    #[must_use]
    pub const fn ready_timeout_minutes(&self) -> u64 {
        self.ready_timeout_minutes
    }

    /// Ready timeout applied to each wait phase.
    #[must_use]
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_minutes.saturating_mul(SECONDS_PER_MINUTE))
    }

    /// Desired subnet group.
    #[must_use]
    pub fn subnet_group_spec(&self) -> SubnetGroupSpec {
        SubnetGroupSpec {
            name: self.subnet_group_name.clone(),
            description: self.subnet_group_description.clone(),
            subnet_ids: self.subnet_ids.clone(),
        }
    }

    /// Desired cluster, placed in the subnet group named `subnet_group_name`.
    #[must_use]
    pub fn cluster_spec(&self, subnet_group_name: &str) -> ClusterSpec {
        ClusterSpec {
            identifier: self.cluster_id.clone(),
            engine: self.engine.clone(),
            engine_version: self.engine_version.clone(),
            master_username: self.master_username.clone(),
            master_user_password: self.master_user_password.clone(),
            security_group_ids: self.security_group_ids.clone(),
            subnet_group_name: subnet_group_name.to_owned(),
        }
    }
}

/// Builder for [`ClusterRequest`] that defers trimming and validation to
/// construction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClusterRequestBuilder {
    region: String,
    profile: Option<String>,
    cluster_id: String,
    engine: String,
    engine_version: String,
    master_username: String,
    master_user_password: MasterPassword,
    security_group_ids: Vec<String>,
    subnet_ids: Vec<String>,
    subnet_group_name: String,
    subnet_group_description: String,
    instance_id: String,
    instance_class: String,
    ready_timeout_minutes: Option<u64>,
}

impl ClusterRequestBuilder {
    /// Creates an empty builder; fields must be populated before build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AWS region.
    #[must_use]
    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = value.into();
        self
    }

    /// Sets the optional shared-config profile.
    #[must_use]
    pub fn profile(mut self, value: Option<String>) -> Self {
        self.profile = value;
        self
    }

    /// Sets the cluster identifier.
    #[must_use]
    pub fn cluster_id(mut self, value: impl Into<String>) -> Self {
        self.cluster_id = value.into();
        self
    }

    /// Sets the engine.
    #[must_use]
    pub fn engine(mut self, value: impl Into<String>) -> Self {
        self.engine = value.into();
        self
    }

    /// Sets the engine version.
    #[must_use]
    pub fn engine_version(mut self, value: impl Into<String>) -> Self {
        self.engine_version = value.into();
        self
    }

    /// Sets the master user name.
    #[must_use]
    pub fn master_username(mut self, value: impl Into<String>) -> Self {
        self.master_username = value.into();
        self
    }

    /// Sets the master password.
    #[must_use]
    pub fn master_user_password(mut self, value: impl Into<String>) -> Self {
        self.master_user_password = MasterPassword::new(value);
        self
    }

    /// Sets the security groups.
    #[must_use]
    pub fn security_group_ids<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.security_group_ids = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the subnets.
    #[must_use]
    pub fn subnet_ids<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subnet_ids = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the subnet group name.
    #[must_use]
    pub fn subnet_group_name(mut self, value: impl Into<String>) -> Self {
        self.subnet_group_name = value.into();
        self
    }

    /// Sets the subnet group description.
    #[must_use]
    pub fn subnet_group_description(mut self, value: impl Into<String>) -> Self {
        self.subnet_group_description = value.into();
        self
    }

    /// Sets the instance identifier.
    #[must_use]
    pub fn instance_id(mut self, value: impl Into<String>) -> Self {
        self.instance_id = value.into();
        self
    }

    /// Sets the instance class.
    #[must_use]
    pub fn instance_class(mut self, value: impl Into<String>) -> Self {
        self.instance_class = value.into();
        self
    }

    /// Sets the ready timeout in minutes. Defaults to
    /// [`DEFAULT_READY_TIMEOUT_MINUTES`].
    #[must_use]
    pub const fn ready_timeout_minutes(mut self, value: u64) -> Self {
        self.ready_timeout_minutes = Some(value);
        self
    }

    /// Builds and validates the [`ClusterRequest`], trimming string inputs.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingField`] naming the first required
    /// field that is blank, or a list that ends up empty.
    pub fn build(self) -> Result<ClusterRequest, RequestError> {
        let request = ClusterRequest {
            region: self.region.trim().to_owned(),
            profile: self
                .profile
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            cluster_id: self.cluster_id.trim().to_owned(),
            engine: self.engine.trim().to_owned(),
            engine_version: self.engine_version.trim().to_owned(),
            master_username: self.master_username.trim().to_owned(),
            master_user_password: self.master_user_password,
            security_group_ids: trimmed(self.security_group_ids).collect(),
            subnet_ids: trimmed(self.subnet_ids).collect(),
            subnet_group_name: self.subnet_group_name.trim().to_owned(),
            subnet_group_description: self.subnet_group_description.trim().to_owned(),
            instance_id: self.instance_id.trim().to_owned(),
            instance_class: self.instance_class.trim().to_owned(),
            ready_timeout_minutes: self
                .ready_timeout_minutes
                .unwrap_or(DEFAULT_READY_TIMEOUT_MINUTES),
        };
        validate(&request)?;
        Ok(request)
    }
}

fn trimmed(values: Vec<String>) -> impl Iterator<Item = String> {
    values
        .into_iter()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn validate(request: &ClusterRequest) -> Result<(), RequestError> {
    let required = [
        ("region", request.region.as_str()),
        ("cluster_id", request.cluster_id.as_str()),
        ("engine", request.engine.as_str()),
        ("engine_version", request.engine_version.as_str()),
        ("master_username", request.master_username.as_str()),
        ("subnet_group_name", request.subnet_group_name.as_str()),
        (
            "subnet_group_description",
            request.subnet_group_description.as_str(),
        ),
        ("instance_id", request.instance_id.as_str()),
        ("instance_class", request.instance_class.as_str()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(RequestError::MissingField((*field).to_owned()));
    }
    if request.master_user_password.is_empty() {
        return Err(RequestError::MissingField(String::from(
            "master_user_password",
        )));
    }
    if request.security_group_ids.is_empty() {
        return Err(RequestError::MissingField(String::from(
            "security_group_ids",
        )));
    }
    if request.subnet_ids.is_empty() {
        return Err(RequestError::MissingField(String::from("subnet_ids")));
    }
    Ok(())
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parses the ready timeout in minutes.
///
/// Missing, unparsable and zero values fall back to
/// [`DEFAULT_READY_TIMEOUT_MINUTES`] with a warning.
#[must_use]
pub fn parse_ready_timeout(raw: Option<&str>) -> u64 {
    let Some(value) = raw.map(str::trim) else {
        warn!(
            default = DEFAULT_READY_TIMEOUT_MINUTES,
            "ready timeout is not set, using default"
        );
        return DEFAULT_READY_TIMEOUT_MINUTES;
    };
    match value.parse::<u64>() {
        Ok(minutes) if minutes > 0 => minutes,
        Ok(_) => {
            warn!(
                value,
                default = DEFAULT_READY_TIMEOUT_MINUTES,
                "ready timeout must be positive, using default"
            );
            DEFAULT_READY_TIMEOUT_MINUTES
        }
        Err(err) => {
            warn!(
                value,
                error = %err,
                default = DEFAULT_READY_TIMEOUT_MINUTES,
                "ready timeout is not a number, using default"
            );
            DEFAULT_READY_TIMEOUT_MINUTES
        }
    }
}
