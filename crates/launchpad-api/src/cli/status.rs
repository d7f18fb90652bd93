//! `lpad status`: read a deployment's current state once.

use anyhow::Result;
use console::style;
use serde_json::json;

use launchpad_core::deploy::HostingProvider;
use launchpad_types::deploy::ReadyState;

use crate::state::AppState;

pub async fn status(state: &AppState, id: &str, json: bool) -> Result<()> {
    let ready_state = state.hosting.ready_state(id).await?;

    if json {
        let doc = json!({
            "id": id,
            "readyState": ready_state,
            "terminal": ready_state.is_terminal(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!();
    println!("  {:<12} {}", style("Deployment").bold(), id);
    println!("  {:<12} {}", style("State").bold(), styled_state(&ready_state));
    println!();
    Ok(())
}

fn styled_state(state: &ReadyState) -> console::StyledObject<String> {
    let text = state.to_string();
    match state {
        ReadyState::Ready => style(text).green().bold(),
        ReadyState::Error | ReadyState::Canceled => style(text).red().bold(),
        _ => style(text).yellow(),
    }
}
