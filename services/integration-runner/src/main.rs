//! Integration Runner - Main Entry Point
//!
//! Loads configuration, runs the selected suites against the live
//! platform, and exits 0 only when every suite passed.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use integration_runner::report::EXIT_FAILURE;
use integration_runner::{
    CommandSchemaOracle, Config, Credentials, EndpointRegistry, HttpProbe, Orchestrator,
    SchemaOracle, SuiteEnv, build_suites,
};
use rust_common::{HttpConfig, RetryConfig, RetryPolicy, TracingConfig, init_tracing};
use secrecy::ExposeSecret;
use tracing::{error, info};

const SERVICE_NAME: &str = "integration-runner";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(&TracingConfig::default().with_service_name(SERVICE_NAME));
            error!("configuration error: {err}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let mut tracing_config = TracingConfig::default()
        .with_service_name(SERVICE_NAME)
        .with_log_level(&config.log_level);
    if config.log_json {
        tracing_config = tracing_config.with_json_output();
    }
    init_tracing(&tracing_config);

    match run(config).await {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(config: Config) -> anyhow::Result<u8> {
    info!(
        gateway = %config.gateway_url,
        suites = config.suites.len(),
        "Starting platform integration run"
    );

    let probe = HttpProbe::new(
        &HttpConfig::default()
            .with_timeout(config.request_timeout())
            .with_user_agent(format!("{SERVICE_NAME}/{}", env!("CARGO_PKG_VERSION"))),
    )
    .context("failed to build HTTP client")?;

    let registry = EndpointRegistry::from_pairs(
        config
            .endpoints()
            .into_iter()
            .map(|(name, url)| (name, url.as_str())),
    )
    .context("invalid service endpoints")?;

    let credentials = Credentials::new(
        config.test_user_email.clone(),
        config.test_user_password.expose_secret(),
    );
    let consistency =
        RetryPolicy::new(RetryConfig::default().with_max_retries(config.consistency_retries));

    let env = Arc::new(
        SuiteEnv::new(probe, registry, credentials)
            .with_request_timeout(config.request_timeout())
            .with_health_timeout(config.health_timeout())
            .with_consistency(consistency),
    );

    let oracle = config
        .schema_check_command
        .as_deref()
        .and_then(CommandSchemaOracle::parse)
        .map(|oracle| Arc::new(oracle) as Arc<dyn SchemaOracle>);

    let suites = build_suites(&config.suites, &env, oracle);

    let mut orchestrator = Orchestrator::new();
    if let Some(timeout) = config.run_timeout() {
        orchestrator = orchestrator.with_run_timeout(timeout);
    }

    let report = orchestrator.run(&suites).await;
    Ok(report.exit_status())
}
