//! Search filter shared by the local and remote adapters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Calendar date format used by both stores (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Escape character declared in `LIKE ... ESCAPE` clauses.
pub const LIKE_ESCAPE: char = '\\';

/// Conjunction of optional predicates. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Exact calendar-day match.
    pub event_date: Option<NaiveDate>,
    /// Literal, case-sensitive substring match on the identifier (or
    /// merchandise code remotely). `%` and `_` carry no wildcard meaning.
    pub identifier_fragment: Option<String>,
}

impl SearchFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from raw user input. Blank strings count as absent.
    pub fn parse(event_date: Option<&str>, identifier_fragment: Option<&str>) -> Result<Self> {
        let event_date = match event_date.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => Some(parse_date(raw)?),
            None => None,
        };
        let identifier_fragment = identifier_fragment
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        Ok(Self {
            event_date,
            identifier_fragment,
        })
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.event_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, fragment: impl Into<String>) -> Self {
        self.identifier_fragment = Some(fragment.into());
        self
    }

    /// The date bind value in store format.
    #[must_use]
    pub fn date_param(&self) -> Option<String> {
        self.event_date
            .map(|date| date.format(DATE_FORMAT).to_string())
    }

    /// The identifier bind value for `LIKE ... ESCAPE '\'`: the fragment with
    /// its own wildcards escaped, wrapped in `%` on both sides.
    #[must_use]
    pub fn like_param(&self) -> Option<String> {
        self.identifier_fragment.as_deref().map(|fragment| {
            let mut pattern = String::with_capacity(fragment.len() + 2);
            pattern.push('%');
            for c in fragment.chars() {
                if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
                    pattern.push(LIKE_ESCAPE);
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }

    /// Evaluate the predicate in memory against a row's raw column values.
    #[must_use]
    pub fn matches(&self, identifier: &str, event_date: &str) -> bool {
        let date_ok = self
            .date_param()
            .is_none_or(|wanted| wanted == event_date);
        let id_ok = self
            .identifier_fragment
            .as_deref()
            .is_none_or(|fragment| identifier.contains(fragment));
        date_ok && id_ok
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| Error::InvalidFilter(format!("date {raw:?} is not YYYY-MM-DD: {err}")))
}
