//! OSD Package Publisher CLI
//!
//! Pushes pre-built package archives into the shared store and publishes
//! one reload notification once the whole batch is durable.

use anyhow::Result;
use clap::Parser;
use osd_publisher::{
    BuildMode, ConfigLoadOptions, ConfigLoader, DeployError, DeployOptions, DeployReport,
    DeployTarget, ENV_DEPLOY_HOST, ENV_DEPLOY_USER, PackagePublisher, RedisPackageStore,
    SshRemoteHost, StoreCredentials,
};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::process;

/// Deploy OSD package archives to the shared store
#[derive(Parser)]
#[command(name = "osd-publisher")]
#[command(version = "0.1.0")]
#[command(about = "Deploy OSD package archives to the shared store", long_about = None)]
struct Cli {
    /// Build mode (dev|production)
    #[arg(value_name = "MODE", value_parser = BuildMode::parse)]
    mode: BuildMode,

    /// Deploy target (frontend|gallery|all)
    #[arg(value_name = "TARGET", default_value = "all", value_parser = DeployTarget::parse)]
    target: DeployTarget,

    /// Configuration file (defaults to ./.osd-deploy.yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    println!("\n📦 osd-publisher\n");

    match deploy(cli).await {
        Ok(report) => {
            print_report(&report);
            Ok(0)
        }
        Err(e) => {
            print_failure(&e);
            Ok(e.exit_code())
        }
    }
}

async fn deploy(cli: Cli) -> Result<DeployReport, DeployError> {
    // Configuration and credential preconditions come first; nothing below
    // touches the network until they pass.
    let options = ConfigLoadOptions {
        project_path: PathBuf::from("."),
        config_file: cli.config.clone(),
        env: std::env::vars().collect(),
    };
    let config = ConfigLoader::load(options).await?;
    ConfigLoader::ensure_valid(&config)?;

    let credentials = StoreCredentials::new();
    let password = credentials.require_store_password()?;

    let user = config
        .deploy_user()
        .ok_or_else(|| DeployError::MissingConfig {
            fields: format!("deploy.user ({ENV_DEPLOY_USER})"),
        })?
        .to_string();
    let host = config
        .deploy_host()
        .ok_or_else(|| DeployError::MissingConfig {
            fields: format!("deploy.host ({ENV_DEPLOY_HOST})"),
        })?
        .to_string();
    let remote = SshRemoteHost::new(user, host);

    println!(
        "🔑 store: {} (auth: {})",
        config.store_endpoint(),
        credentials.mask(password.expose_secret())
    );

    let store = RedisPackageStore::connect(
        config.store_host(),
        config.store_port(),
        Some(&password),
    )
    .await
    .map_err(|e| DeployError::Connectivity {
        endpoint: config.store_endpoint(),
        message: e.to_string(),
    })?;

    let mut publisher = PackagePublisher::new(config, store, remote);
    publisher
        .publish(DeployOptions {
            mode: cli.mode,
            target: cli.target,
        })
        .await
}

fn print_report(report: &DeployReport) {
    println!("\n✅ Deploy completed successfully!");
    println!(
        "   mode: {}, target: {}, version: {}",
        report.mode, report.target, report.version
    );
    println!("   uploaded: {}", report.uploaded.join(", "));
    println!(
        "   notification: \"{}\" ({} receivers)",
        report.notification, report.receivers
    );
    println!("   duration: {}ms", report.duration);
}

fn print_failure(error: &DeployError) {
    eprintln!("\n❌ Deploy failed [{}]", error.code());
    eprintln!("{}", error);

    let actions = error.suggested_actions();
    if !actions.is_empty() {
        eprintln!("\n対処方法:");
        for action in actions {
            eprintln!("  - {}", action);
        }
    }
}
