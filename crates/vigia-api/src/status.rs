//! Status page parsing.
//!
//! The upstream status pages are plain HTML: one `<table>` where each
//! data row holds a service name in the first cell and its state in the
//! last. Header/separator rows carry `class="info"` and are skipped.
//! A service is healthy iff its status cell is the literal string `up`
//! (case-sensitive); every other value counts as an outage.

use std::fmt;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::Error;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table tr").expect("static selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static selector"));

/// Class attribute marking structural (non-data) rows.
const STRUCTURAL_ROW_CLASS: &str = "info";

/// Status cell value that counts as healthy. Case-sensitive.
const HEALTHY_LITERAL: &str = "up";

// ── ServiceState ─────────────────────────────────────────────────────

/// Observed state of a single service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Up,
    Down,
    /// The service is not listed on the status page (or no status has
    /// been observed yet).
    Unknown,
}

impl ServiceState {
    /// Classify a raw status cell value.
    pub fn from_status_text(text: &str) -> Self {
        if text == HEALTHY_LITERAL {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ── StatusSnapshot ───────────────────────────────────────────────────

/// The parsed result of one status page fetch.
///
/// `ok` and `ko` preserve row-encounter order and duplicates; no row
/// lands in both. Service names are verbatim from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub ok: Vec<String>,
    pub ko: Vec<String>,
}

impl StatusSnapshot {
    /// Membership state of a service in this snapshot.
    ///
    /// Case-sensitive, unlike [`lookup_service`] -- the asymmetry is
    /// inherited from the contract: snapshots carry names verbatim,
    /// while the single-service lookup is forgiving about user input.
    pub fn state_of(&self, service: &str) -> ServiceState {
        if self.ok.iter().any(|s| s == service) {
            ServiceState::Up
        } else if self.ko.iter().any(|s| s == service) {
            ServiceState::Down
        } else {
            ServiceState::Unknown
        }
    }

    /// Total number of services listed.
    pub fn len(&self) -> usize {
        self.ok.len() + self.ko.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ok.is_empty() && self.ko.is_empty()
    }
}

// ── Parsing ──────────────────────────────────────────────────────────

/// Iterate the data rows of a status page as (service, status) pairs.
fn data_rows(document: &Html) -> impl Iterator<Item = (String, String)> + '_ {
    document.select(&ROW_SELECTOR).filter_map(|row| {
        if row.value().attr("class") == Some(STRUCTURAL_ROW_CLASS) {
            return None;
        }
        let mut cells = row.select(&CELL_SELECTOR);
        let first = cells.next()?;
        let service: String = first.text().collect();
        let status: String = cells.last().unwrap_or(first).text().collect();
        Some((service, status))
    })
}

/// Parse a raw status page into a [`StatusSnapshot`].
///
/// Pure: parsing the same text twice yields identical snapshots.
/// Returns [`Error::Parse`] when the page contains no data rows at all
/// (empty or structurally unrecognizable markup).
pub fn parse_status_page(raw: &str) -> Result<StatusSnapshot, Error> {
    let document = Html::parse_document(raw);
    let mut snapshot = StatusSnapshot::default();

    for (service, status) in data_rows(&document) {
        if ServiceState::from_status_text(&status) == ServiceState::Up {
            snapshot.ok.push(service);
        } else {
            snapshot.ko.push(service);
        }
    }

    if snapshot.is_empty() {
        return Err(Error::Parse {
            reason: "no service rows found in status table".into(),
        });
    }
    Ok(snapshot)
}

/// Look up a single service's state on a raw status page.
///
/// Matches `service` case-insensitively against the first column;
/// first match wins. Returns [`ServiceState::Unknown`] when no row
/// matches -- an unlisted service is a value, not an error.
pub fn lookup_service(raw: &str, service: &str) -> ServiceState {
    let document = Html::parse_document(raw);
    let wanted = service.to_lowercase();

    for (name, status) in data_rows(&document) {
        if name.to_lowercase() == wanted {
            return ServiceState::from_status_text(&status);
        }
    }
    ServiceState::Unknown
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(rows: &[(&str, &str)]) -> String {
        let mut html = String::from(
            "<html><body><table><tr class=\"info\"><td>Service</td><td>Status</td></tr>",
        );
        for (service, status) in rows {
            html.push_str(&format!("<tr><td>{service}</td><td>{status}</td></tr>"));
        }
        html.push_str("</table></body></html>");
        html
    }

    #[test]
    fn parses_ok_and_ko_in_row_order() {
        let raw = page(&[
            ("cloudantNoSQLDB", "up"),
            ("objectstorage", "down"),
            ("natural_language_classifier", "up"),
        ]);
        let snapshot = parse_status_page(&raw).unwrap();
        assert_eq!(
            snapshot.ok,
            vec!["cloudantNoSQLDB", "natural_language_classifier"]
        );
        assert_eq!(snapshot.ko, vec!["objectstorage"]);
    }

    #[test]
    fn healthy_literal_is_case_sensitive() {
        let raw = page(&[("serviceA", "UP"), ("serviceB", "up")]);
        let snapshot = parse_status_page(&raw).unwrap();
        assert_eq!(snapshot.ok, vec!["serviceB"]);
        assert_eq!(snapshot.ko, vec!["serviceA"]);
    }

    #[test]
    fn any_non_up_value_counts_as_outage() {
        let raw = page(&[("a", "down"), ("b", "degraded"), ("c", "maintenance")]);
        let snapshot = parse_status_page(&raw).unwrap();
        assert!(snapshot.ok.is_empty());
        assert_eq!(snapshot.ko.len(), 3);
    }

    #[test]
    fn structural_rows_are_skipped() {
        let raw = page(&[("only", "up")]);
        let snapshot = parse_status_page(&raw).unwrap();
        // The class="info" header row must not produce a "Service" entry.
        assert_eq!(snapshot.ok, vec!["only"]);
        assert!(snapshot.ko.is_empty());
    }

    #[test]
    fn duplicates_are_preserved() {
        let raw = page(&[("dup", "up"), ("dup", "up")]);
        let snapshot = parse_status_page(&raw).unwrap();
        assert_eq!(snapshot.ok, vec!["dup", "dup"]);
    }

    #[test]
    fn parse_is_idempotent() {
        let raw = page(&[("a", "up"), ("b", "down")]);
        assert_eq!(
            parse_status_page(&raw).unwrap(),
            parse_status_page(&raw).unwrap()
        );
    }

    #[test]
    fn ok_and_ko_are_disjoint() {
        let raw = page(&[("a", "up"), ("b", "down"), ("c", "up"), ("d", "flaky")]);
        let snapshot = parse_status_page(&raw).unwrap();
        assert!(snapshot.ok.iter().all(|s| !snapshot.ko.contains(s)));
    }

    #[test]
    fn empty_markup_is_a_parse_error() {
        assert!(matches!(
            parse_status_page(""),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            parse_status_page("<html><body><p>maintenance</p></body></html>"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn lookup_is_case_insensitive_first_match_wins() {
        let raw = page(&[("CloudantNoSQLDB", "up"), ("cloudantnosqldb", "down")]);
        assert_eq!(lookup_service(&raw, "cloudantNoSQLDB"), ServiceState::Up);
    }

    #[test]
    fn lookup_unlisted_service_is_unknown() {
        let raw = page(&[("a", "up")]);
        assert_eq!(lookup_service(&raw, "missing"), ServiceState::Unknown);
    }

    #[test]
    fn snapshot_membership_is_case_sensitive() {
        let raw = page(&[("ServiceA", "up")]);
        let snapshot = parse_status_page(&raw).unwrap();
        assert_eq!(snapshot.state_of("ServiceA"), ServiceState::Up);
        assert_eq!(snapshot.state_of("servicea"), ServiceState::Unknown);
    }
}
