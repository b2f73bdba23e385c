//! Drive a sync session against an in-memory form and router.
//!
//! Script lines:
//!
//! ```text
//! edit <field> <raw>   # user edit; raw is decoded per field kind
//! clear <field>        # reset a field to its neutral value
//! visit <query>        # outside navigation (link, back button)
//! wait <ms>            # let time pass
//! show                 # print form value and URL
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{bail, Context, Result};
use formurl_sync_core::{decode, neutral_value};
use formurl_sync_engine::{
    FormHandle, MemoryForm, MemoryRouter, Router, SyncEvent, SyncSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::FilterConfig;
use crate::json::snapshot_to_json;
use crate::query::{parse_query, render_query};

/// Extra time after the last step so a pending write can land.
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

/// One script instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// User edit.
    Edit {
        /// Field name.
        field: String,
        /// Wire-encoded value.
        raw: String,
    },
    /// Reset to neutral.
    Clear {
        /// Field name.
        field: String,
    },
    /// Outside navigation.
    Visit {
        /// Query string.
        query: String,
    },
    /// Let time pass.
    Wait(Duration),
    /// Print state.
    Show,
}

/// Parse a script into steps.
pub fn parse_script(script: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("line {}: {}", index + 1, line))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match command {
        "edit" => {
            let (field, raw) = rest.split_once(' ').context("usage: edit <field> <value>")?;
            Ok(Step::Edit {
                field: field.to_string(),
                raw: raw.trim().to_string(),
            })
        }
        "clear" if !rest.is_empty() => Ok(Step::Clear {
            field: rest.to_string(),
        }),
        "visit" => Ok(Step::Visit {
            query: rest.to_string(),
        }),
        "wait" => {
            let ms: u64 = rest.parse().context("usage: wait <ms>")?;
            Ok(Step::Wait(Duration::from_millis(ms)))
        }
        "show" => Ok(Step::Show),
        _ => bail!("unknown step"),
    }
}

/// Run the simulate command, printing to stdout.
pub async fn run(config: &FilterConfig, initial: Option<&str>, script: &str) -> Result<()> {
    let output = simulate(config, initial, script).await?;
    for line in output {
        println!("{}", line);
    }
    Ok(())
}

/// Run a script and collect the printed lines.
pub async fn simulate(
    config: &FilterConfig,
    initial: Option<&str>,
    script: &str,
) -> Result<Vec<String>> {
    let steps = parse_script(script)?;
    let sync = config.sync_config()?;
    let schema = sync.schema.clone();
    let debounce = sync.debounce;

    let form = Arc::new(MemoryForm::for_schema(&schema));
    let router = Arc::new(MemoryRouter::with_params(
        initial.map(parse_query).unwrap_or_default(),
    ));
    let session = SyncSession::activate(form.clone(), router.clone(), sync)
        .context("Session did not activate")?;
    let mut events = session.events();

    let mut out = Vec::new();
    out.push(format!("initial: {}", compact(&snapshot_to_json(&form.value())?)));

    for step in steps {
        match step {
            Step::Edit { field, raw } => {
                let kind = schema
                    .kind_of(&field)
                    .with_context(|| format!("Unknown field '{}'", field))?;
                let value = decode(&raw, kind)
                    .with_context(|| format!("'{}' is not a valid {}", raw, kind))?;
                form.set_value(&field, value);
            }
            Step::Clear { field } => {
                let kind = schema
                    .kind_of(&field)
                    .with_context(|| format!("Unknown field '{}'", field))?;
                form.set_value(&field, neutral_value(kind));
            }
            Step::Visit { query } => router.visit(parse_query(&query)),
            Step::Wait(duration) => tokio::time::sleep(duration).await,
            Step::Show => {
                collect_events(&mut events, &mut out);
                out.push(format!("form: {}", compact(&snapshot_to_json(&form.value())?)));
                out.push(format!("url: ?{}", render_query(&router.query_params())));
            }
        }
        // Let the session task observe the step.
        tokio::task::yield_now().await;
    }

    tokio::time::sleep(debounce + SETTLE_MARGIN).await;
    collect_events(&mut events, &mut out);
    session.shutdown().await;

    out.push(format!("url: ?{}", render_query(&router.query_params())));
    Ok(out)
}

fn collect_events(events: &mut broadcast::Receiver<SyncEvent>, out: &mut Vec<String>) {
    while let Ok(event) = events.try_recv() {
        out.push(describe(&event));
    }
}

fn describe(event: &SyncEvent) -> String {
    match event {
        SyncEvent::StateApplied { snapshot } => match snapshot_to_json(snapshot) {
            Ok(json) => format!("applied: {}", compact(&json)),
            Err(_) => "applied".to_string(),
        },
        SyncEvent::Evaluated { .. } => "evaluated".to_string(),
        SyncEvent::UrlWritten { params } => format!("written: ?{}", render_query(params)),
        SyncEvent::NavigationRejected { error } => format!("rejected: {}", error),
    }
}

/// Collapse pretty JSON onto one line.
fn compact(json: &str) -> String {
    json.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}
