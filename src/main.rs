mod cli;
mod config;
mod error;
mod model;
mod pipeline;
mod store;
mod tracker;
mod util;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;
use config::JiraConfig;
use pipeline::Pipeline;
use store::CsvStore;
use tracker::jira::JiraClient;
use tracker::IssueTracker;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Pick up credentials from .env without overriding the real environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = run(&cli, |key| std::env::var(key).ok()).await;
    if let Err(e) = &result {
        tracing::error!("{e}");
    }
    ExitCode::from(exit_status(&result))
}

fn exit_status(result: &error::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

async fn run(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> error::Result<()> {
    tracing::info!("Starting bulk user story processing");

    // Credentials are checked before the input file is touched
    let jira = JiraConfig::from_lookup(env)?;
    let config = config::load_config(cli, jira)?;
    tracing::debug!(?config, "Resolved configuration");

    let client = JiraClient::connect(&config.jira).await?;
    let store = CsvStore::new(&config.input);

    let summary = Pipeline::new(&client, &store, &config.fields).run().await?;

    println!("{}", summary.message());
    tracing::info!(
        tracker = client.name(),
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        failed = summary.failed,
        "Bulk processing complete"
    );
    Ok(())
}
