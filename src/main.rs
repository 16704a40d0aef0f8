use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use gha_run_cleaner::infrastructures::adapters::primary::cli::{
    Cli, ExitStatus, WorkflowRunCleaner,
};
use gha_run_cleaner::infrastructures::adapters::primary::console::TerminalConsole;
use gha_run_cleaner::infrastructures::adapters::secondary::credentials;
use gha_run_cleaner::infrastructures::adapters::secondary::external_apis::github::GitHubApiAdapter;
use gha_run_cleaner::infrastructures::telemetry;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitStatus::Failure.into()
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let telemetry = match telemetry::init(cli.verbose) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            return ExitStatus::Failure.into();
        }
    };

    let status = match run(cli).instrument(info_span!("gha_run_cleaner")).await {
        Ok(status) => status,
        Err(e) => {
            tracing::debug!("Aborting: {:#}", e);
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitStatus::Failure
        }
    };

    telemetry.shutdown();
    status.into()
}

async fn run(cli: Cli) -> anyhow::Result<ExitStatus> {
    let current_dir = std::env::current_dir().context("Failed to read the current directory")?;
    let resolved =
        credentials::resolve_credentials(cli.token.clone(), cli.repo.as_deref(), &current_dir)
            .context("Failed to resolve GitHub credentials")?;
    info!("Managing workflow runs of {:?}", resolved);

    let github_api_adapter = Arc::new(GitHubApiAdapter::new(
        cli.api_url.clone(),
        resolved.token,
    ));
    let mut cleaner = WorkflowRunCleaner::new(github_api_adapter, TerminalConsole);

    Ok(cleaner.run(cli.clean_options(resolved.repository)).await)
}
