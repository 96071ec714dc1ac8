//! Binary entry point for `aurora-provision`.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use aurora_provision::request::env as request_env;
use aurora_provision::{
    AwsRdsBackend, ClusterRequest, ConfigError, ProvisionError, Provisioner, ReadinessConfig,
    RequestError, parse_ready_timeout, split_list,
};

mod cli;

use cli::Cli;

const DEFAULT_LOG_FILTER: &str = "info,aws_config=warn,aws_sdk_rds=warn,aws_smithy_runtime=warn";

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),
    #[error("invalid readiness settings: {0}")]
    Config(#[from] ConfigError),
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let request = build_request(cli)?;
    let poller = ReadinessConfig::load_without_cli_args()?.poller()?;
    let backend = AwsRdsBackend::connect(request.region(), request.profile()).await;

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    Provisioner::new(backend)
        .with_poller(poller)
        .with_cancellation(cancel)
        .execute(&request)
        .await?;
    Ok(())
}

fn build_request(cli: Cli) -> Result<ClusterRequest, RequestError> {
    let ready_timeout_minutes = parse_ready_timeout(cli.ready_timeout_minutes.as_deref());
    ClusterRequest::builder()
        .region(cli.region)
        .profile(cli.profile)
        .cluster_id(cli.cluster_id)
        .engine(cli.engine)
        .engine_version(cli.engine_version)
        .master_username(cli.master_username)
        .master_user_password(cli.master_user_password)
        .security_group_ids(split_list(&cli.security_group_ids))
        .subnet_ids(split_list(&cli.subnets))
        .subnet_group_name(cli.subnet_group_name)
        .subnet_group_description(cli.subnet_group_description)
        .instance_id(cli.instance_id)
        .instance_class(cli.instance_class)
        .ready_timeout_minutes(ready_timeout_minutes)
        .build()
}

fn cancel_on_interrupt(cancel: CancellationToken) {
    drop(tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, cancelling readiness waits");
                cancel.cancel();
            }
            Err(err) => warn!(error = %err, "unable to listen for interrupts"),
        }
    }));
}

fn report_error(err: &CliError) {
    let stderr = io::stderr();
    let handle = stderr.lock();
    write_error(handle, err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "error: {err}").ok();
}
