//! Output formatting: text tables and JSON.
//!
//! Text mode uses `tabled` for region summaries and colored one-liners
//! elsewhere; JSON mode serializes the underlying data via serde.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use vigia_core::{
    COLOR_HEALTHY, Notification, RegionStatus, ServiceState,
};

use crate::cli::OutputFormat;

/// Determine whether color output should be enabled.
fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err()
}

fn paint_state(state: ServiceState) -> String {
    if should_color() {
        match state {
            ServiceState::Up => state.to_string().green().to_string(),
            ServiceState::Down => state.to_string().red().to_string(),
            ServiceState::Unknown => state.to_string().dimmed().to_string(),
        }
    } else {
        state.to_string()
    }
}

// ── Region summary ───────────────────────────────────────────────────

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "SERVICE")]
    service: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

pub fn render_region(format: &OutputFormat, status: &RegionStatus) -> String {
    match format {
        OutputFormat::Text => {
            let rows: Vec<ServiceRow> = status
                .snapshot
                .ok
                .iter()
                .map(|s| ServiceRow {
                    service: s.clone(),
                    status: paint_state(ServiceState::Up),
                })
                .chain(status.snapshot.ko.iter().map(|s| ServiceRow {
                    service: s.clone(),
                    status: paint_state(ServiceState::Down),
                }))
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            format!(
                "{} ({} services, {} down)\n{table}",
                status.region.region,
                status.snapshot.len(),
                status.snapshot.ko.len(),
            )
        }
        OutputFormat::Json => render_json(&serde_json::json!({
            "region": status.region.region,
            "domain": status.region.domain,
            "url": status.region.url.as_str(),
            "ok": status.snapshot.ok,
            "ko": status.snapshot.ko,
        })),
    }
}

// ── Single service ───────────────────────────────────────────────────

pub fn render_service(
    format: &OutputFormat,
    region: &str,
    service: &str,
    state: ServiceState,
) -> String {
    match format {
        OutputFormat::Text => {
            format!("{service} in {region}: {}", paint_state(state))
        }
        OutputFormat::Json => render_json(&serde_json::json!({
            "region": region,
            "service": service,
            "state": state,
        })),
    }
}

// ── Notifications ────────────────────────────────────────────────────

pub fn render_notification(format: &OutputFormat, notification: &Arc<Notification>) -> String {
    match format {
        OutputFormat::Text => {
            let stamp = notification.at.format("%H:%M:%S");
            let line = format!("[{stamp}] {}: {}", notification.title, notification.detail);
            if should_color() {
                match notification.color {
                    Some(COLOR_HEALTHY) => line.green().to_string(),
                    Some(_) => line.red().to_string(),
                    None => line.dimmed().to_string(),
                }
            } else {
                line
            }
        }
        OutputFormat::Json => render_json(notification.as_ref()),
    }
}

// ── Plumbing ─────────────────────────────────────────────────────────

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
