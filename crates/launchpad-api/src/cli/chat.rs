//! `lpad chat`: one turn from the terminal.
//!
//! Streams the reply as it arrives, hides the DEPLOY_CONFIG block behind a
//! progress spinner while its code is being written, then reports the
//! deployment outcome.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;

use launchpad_core::turn::TurnReport;
use launchpad_infra::deploy::vercel::TOKEN_ENV;
use launchpad_types::deploy::{DeployReport, DeploymentStatus, FailureKind};
use launchpad_types::directive::FENCE_OPEN;
use launchpad_types::event::TurnEvent;
use launchpad_types::llm::Message;

use crate::output::TurnOutput;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub stream: bool,
    pub json: bool,
    pub quiet: bool,
}

impl ChatOptions {
    fn styled(&self) -> bool {
        !self.json && !self.quiet
    }
}

pub async fn chat(state: &AppState, message: String, options: ChatOptions) -> Result<()> {
    let orchestrator = state.orchestrator().map_err(anyhow::Error::msg)?;
    let history = vec![Message::user(message)];

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let result = if options.stream {
        let (tx, rx) = mpsc::unbounded_channel();
        let display = tokio::spawn(render_events(rx, options));
        let result = orchestrator.run_streaming(&history, tx, cancel.clone()).await;
        // The channel is closed once the turn returns.
        display.await?;
        result
    } else {
        let spinner = options.styled().then(|| spinner("Generating..."));
        let result = orchestrator.run_complete(&history).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        if let Ok(report) = &result {
            if options.styled() {
                println!("{}", report.reply.message);
            }
        }
        result
    };
    ctrl_c.abort();

    let report = result?;
    print_outcome(&report, options)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Echo the turn's events to the terminal as they arrive.
async fn render_events(mut rx: UnboundedReceiver<TurnEvent>, options: ChatOptions) {
    let mut printer = LivePrinter::default();
    let mut progress: Option<ProgressBar> = None;
    let mut stdout = std::io::stdout();

    while let Some(event) = rx.recv().await {
        if !options.styled() {
            continue;
        }
        match event {
            TurnEvent::TextDelta { text } => {
                let visible = printer.push(&text);
                if !visible.is_empty() {
                    print!("{visible}");
                    let _ = stdout.flush();
                }
            }
            TurnEvent::PartialCode(partial) => {
                let bar = progress.get_or_insert_with(|| spinner("Writing code..."));
                let target = partial.path.as_deref().unwrap_or("code");
                bar.set_message(format!("Writing {target}... {} chars", partial.code.chars().count()));
            }
            TurnEvent::Reply(reply) => {
                if let Some(bar) = progress.take() {
                    bar.finish_and_clear();
                }
                let rest = printer.remainder(&reply.message);
                println!("{rest}");
            }
            TurnEvent::Status(DeploymentStatus::Deploying) => {
                progress = Some(spinner("Deploying..."));
            }
            TurnEvent::Status(_) => {
                if let Some(bar) = progress.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }

    if let Some(bar) = progress.take() {
        bar.finish_and_clear();
    }
}

fn print_outcome(report: &TurnReport, options: ChatOptions) -> Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(&TurnOutput::from(report))?);
        return Ok(());
    }

    if options.quiet {
        println!("{}", report.reply.message);
        if let Some(DeployReport::Live { url, .. }) = &report.deployment {
            println!("{url}");
        }
        return Ok(());
    }

    match &report.deployment {
        Some(DeployReport::Live { url, note, .. }) => {
            println!();
            println!(
                "  {} Your app is live at {}",
                style("✓").green().bold(),
                style(url).cyan().underlined()
            );
            if let Some(note) = note {
                println!("  {}", style(format!("{note}; give it a minute.")).yellow());
            }
        }
        Some(DeployReport::Failed { error, kind }) => {
            println!();
            println!("  {} Deployment failed: {}", style("✗").red().bold(), error);
            if *kind == FailureKind::Configuration {
                println!("  {}", style(format!("Set {TOKEN_ENV} to deploy.")).dim());
            }
        }
        None if report.reply.should_deploy() => {
            let why = if report.cancelled {
                "cancelled"
            } else {
                "--no-deploy"
            };
            println!();
            println!("  {}", style(format!("Directive not deployed ({why})")).dim());
        }
        None => {}
    }
    println!();
    Ok(())
}

/// Tracks how much of the running text has been echoed.
///
/// Text is echoed up to the directive fence. A tail that could still turn
/// into the fence is held back until the next fragment decides it.
#[derive(Debug, Default)]
struct LivePrinter {
    text: String,
    printed: usize,
    in_directive: bool,
}

impl LivePrinter {
    /// Append a fragment and return the newly printable slice.
    fn push(&mut self, fragment: &str) -> &str {
        self.text.push_str(fragment);
        if self.in_directive {
            return "";
        }

        let limit = match self.text.find(FENCE_OPEN) {
            Some(at) => {
                self.in_directive = true;
                at
            }
            None => self.text.len() - fence_prefix_len(&self.text),
        };

        let start = self.printed;
        if limit <= start {
            return "";
        }
        self.printed = limit;
        &self.text[start..limit]
    }

    /// What is left to show once the final message is known.
    fn remainder<'a>(&self, message: &'a str) -> &'a str {
        let shown = self.text[..self.printed].trim();
        if shown.is_empty() {
            return message;
        }
        message.strip_prefix(shown).unwrap_or(message)
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of the fence.
fn fence_prefix_len(text: &str) -> usize {
    let fence = FENCE_OPEN.as_bytes();
    (1..fence.len())
        .rev()
        .find(|&n| text.as_bytes().ends_with(&fence[..n]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(parts: &[&str]) -> (String, LivePrinter) {
        let mut printer = LivePrinter::default();
        let mut out = String::new();
        for part in parts {
            out.push_str(printer.push(part));
        }
        (out, printer)
    }

    #[test]
    fn printer_stops_at_the_fence() {
        let (out, printer) = echo(&["Sure! Here", " it is.\n", "```DEPLOY_CONFIG\n{\"code\": \"x\"}\n```"]);
        assert_eq!(out, "Sure! Here it is.\n");
        assert!(printer.in_directive);
    }

    #[test]
    fn printer_holds_back_a_split_fence() {
        let mut printer = LivePrinter::default();
        assert_eq!(printer.push("Sure! ``"), "Sure! ");
        assert_eq!(printer.push("`DEPLOY"), "");
        assert_eq!(printer.push("_CONFIG\n{"), "");
        assert!(printer.in_directive);
    }

    #[test]
    fn printer_releases_other_fences() {
        let (out, printer) = echo(&["Use ``", "`html\n<p>", "</p>\n```"]);
        // The trailing fence could still be a directive, so it waits for the reply.
        assert_eq!(out, "Use ```html\n<p></p>\n");
        assert!(!printer.in_directive);
        assert_eq!(printer.remainder("Use ```html\n<p></p>\n```"), "\n```");
    }

    #[test]
    fn remainder_after_echoed_prefix() {
        let (_, printer) = echo(&["Sure! ", "```DEPLOY_CONFIG\n{}\n```"]);
        assert_eq!(printer.remainder("Sure!"), "");

        let (_, printer) = echo(&["```DEPLOY_CONFIG\n{}\n```"]);
        assert_eq!(printer.remainder("Building your app now! 🚀"), "Building your app now! 🚀");
    }

    #[test]
    fn remainder_includes_text_after_the_block() {
        let (_, printer) = echo(&["Sure!\n", "```DEPLOY_CONFIG\n{}\n```\nEnjoy."]);
        assert_eq!(printer.remainder("Sure!\n\nEnjoy."), "\n\nEnjoy.");
    }
}
