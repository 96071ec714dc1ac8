//! Command-line interface definitions for the `aurora-provision` binary.
//!
//! Every flag falls back to an environment variable, so the tool can be
//! driven entirely from the environment. The build script includes this
//! module to render the manual page; both crates expose the variable names
//! as `crate::request_env`.

use clap::Parser;

use crate::request_env as env;

/// Top-level CLI for the `aurora-provision` binary.
#[derive(Debug, Parser)]
#[command(
    name = "aurora-provision",
    about = "Create or update an Aurora cluster, its subnet group and its primary instance",
    long_about = "Create or update an Aurora cluster, its subnet group and its primary \
                  instance, then wait until each reports a stable available status. \
                  Readiness polling can be tuned with AURORA_POLL_INTERVAL_SECS and \
                  AURORA_REQUIRED_CONFIRMATIONS or an aurora.toml file."
)]
pub(crate) struct Cli {
    /// AWS region to operate in.
    #[arg(long, env = env::AWS_REGION, value_name = "REGION")]
    pub(crate) region: String,
    /// Shared-config profile used to resolve credentials.
    #[arg(long, env = env::AWS_PROFILE, value_name = "PROFILE")]
    pub(crate) profile: Option<String>,
    /// Identifier of the DB cluster.
    #[arg(long, env = env::CLUSTER_ID, value_name = "ID")]
    pub(crate) cluster_id: String,
    /// Database engine, for example `aurora-postgresql`.
    #[arg(long, env = env::ENGINE)]
    pub(crate) engine: String,
    /// Engine version the cluster should run.
    #[arg(long, env = env::ENGINE_VERSION, value_name = "VERSION")]
    pub(crate) engine_version: String,
    /// Master user name.
    #[arg(long, env = env::MASTER_USERNAME, value_name = "USER")]
    pub(crate) master_username: String,
    /// Master user password. Applied on every run.
    #[arg(
        long,
        env = env::MASTER_USER_PASSWORD,
        value_name = "PASSWORD",
        hide_env_values = true
    )]
    pub(crate) master_user_password: String,
    /// Name of the DB subnet group.
    #[arg(long, env = env::SUBNET_GROUP_NAME, value_name = "NAME")]
    pub(crate) subnet_group_name: String,
    /// Description used when the subnet group is created.
    #[arg(long, env = env::SUBNET_GROUP_DESCRIPTION, value_name = "TEXT")]
    pub(crate) subnet_group_description: String,
    /// Comma-separated VPC security group identifiers.
    #[arg(long, env = env::SECURITY_GROUP_IDS, value_name = "IDS")]
    pub(crate) security_group_ids: String,
    /// Comma-separated subnet identifiers for the subnet group.
    #[arg(long, env = env::SUBNETS, value_name = "IDS")]
    pub(crate) subnets: String,
    /// Identifier of the primary instance.
    #[arg(long, env = env::INSTANCE_ID, value_name = "ID")]
    pub(crate) instance_id: String,
    /// Instance class, for example `db.r5.large`.
    #[arg(long, env = env::INSTANCE_CLASS, value_name = "CLASS")]
    pub(crate) instance_class: String,
    /// Minutes to wait for each resource to become ready. Missing, zero or
    /// non-numeric values fall back to one minute.
    #[arg(long, env = env::READY_TIMEOUT_MINUTES, value_name = "MINUTES")]
    pub(crate) ready_timeout_minutes: Option<String>,
}
