//! # Due Date Normalizer
//!
//! Bills arrive with due dates in several textual encodings. Parsing tries an
//! ordered list of strategies and the first one that succeeds wins:
//!
//! 1. `YYYY-MM-DD`
//! 2. `MM/DD/YYYY`
//! 3. `DD/MM/YYYY`
//! 4. `YYYY/MM/DD`
//! 5. ISO-8601 timestamp (RFC 3339 with offset or `Z`, or a naive date-time),
//!    keeping only the date part
//!
//! `MM/DD/YYYY` is tried before `DD/MM/YYYY`, so `03/04/2024` is March 4th.
//! Anything else is `Unparseable`; parsing never fails a batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used whenever the backend writes a date
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDueDate {
    Parsed(NaiveDate),
    Unparseable,
}

impl ParsedDueDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            ParsedDueDate::Parsed(date) => Some(date),
            ParsedDueDate::Unparseable => None,
        }
    }

    /// The date rendered as `YYYY-MM-DD`
    pub fn canonical(self) -> Option<String> {
        self.date()
            .map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
    }
}

#[derive(Debug, Clone, Copy)]
enum ParseStrategy {
    Format(&'static str),
    IsoTimestamp,
}

impl ParseStrategy {
    fn parse(&self, input: &str) -> Option<NaiveDate> {
        match self {
            ParseStrategy::Format(format) => NaiveDate::parse_from_str(input, format).ok(),
            ParseStrategy::IsoTimestamp => parse_iso_timestamp(input),
        }
    }
}

/// Priority order matters, see the module docs
const STRATEGIES: [ParseStrategy; 5] = [
    ParseStrategy::Format("%Y-%m-%d"),
    ParseStrategy::Format("%m/%d/%Y"),
    ParseStrategy::Format("%d/%m/%Y"),
    ParseStrategy::Format("%Y/%m/%d"),
    ParseStrategy::IsoTimestamp,
];

fn parse_iso_timestamp(input: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.date_naive());
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|timestamp| timestamp.date())
}

/// Normalize a bill's due date field
pub fn normalize_due_date(raw: Option<&str>) -> ParsedDueDate {
    let Some(input) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return ParsedDueDate::Unparseable;
    };

    STRATEGIES
        .iter()
        .find_map(|strategy| strategy.parse(input))
        .map_or(ParsedDueDate::Unparseable, ParsedDueDate::Parsed)
}
