//! `lpad deploy`: submit a saved directive without a generation turn.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use launchpad_core::directive::finalize;
use launchpad_infra::deploy::vercel::TOKEN_ENV;
use launchpad_types::deploy::{DeployReport, FailureKind};
use launchpad_types::directive::{DeployDirective, FENCE_OPEN};

use crate::http::handlers::deploy::DeployBody;
use crate::state::AppState;

/// Read a directive from either a saved reply containing a DEPLOY_CONFIG
/// block or a bare `{ code, projectName? }` JSON document.
fn load_directive(text: &str) -> Result<DeployDirective> {
    if text.contains(FENCE_OPEN) {
        let reply = finalize(text);
        return match reply.deployable() {
            Some(directive) => Ok(directive.clone()),
            None => bail!("no deployable directive found"),
        };
    }

    let body: DeployBody =
        serde_json::from_str(text).context("expected a DEPLOY_CONFIG block or a JSON deploy body")?;
    Ok(body.into_directive()?)
}

pub async fn deploy(state: &AppState, file: &Path, json: bool, quiet: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let directive = load_directive(&text)?;

    let spinner = (!json && !quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Deploying {}...", directive.project_name()));
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    });

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });
    let report = state.pipeline.run(&directive, &cancel).await;
    ctrl_c.abort();

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match &report {
        DeployReport::Live { url, note, .. } => {
            if quiet {
                println!("{url}");
            } else if !json {
                println!();
                println!(
                    "  {} {} is live at {}",
                    style("✓").green().bold(),
                    style(directive.project_name()).bold(),
                    style(url).cyan().underlined()
                );
                if let Some(note) = note {
                    println!("  {}", style(format!("{note}; give it a minute.")).yellow());
                }
                println!();
            }
            Ok(())
        }
        DeployReport::Failed { error, kind } => {
            if !json && !quiet {
                println!();
                println!("  {} Deployment failed: {}", style("✗").red().bold(), error);
                if *kind == FailureKind::Configuration {
                    println!("  {}", style(format!("Set {TOKEN_ENV} and try again.")).dim());
                }
                println!();
            }
            bail!("{error}")
        }
    }
}
