/*!
 * Entry filters for the admin entry list.
 */

use chrono::{DateTime, Duration, Months, Utc};
use std::str::FromStr;

use crate::database::models::JournalEntryRecord;

/// Time window of the entry list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRangeFilter {
    #[default]
    All,
    /// Since midnight UTC
    Today,
    /// Last 7 days
    Week,
    /// Last calendar month
    Month,
}

impl DateRangeFilter {
    /// Earliest timestamp kept, `None` for no bound
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRangeFilter::All => None,
            DateRangeFilter::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            DateRangeFilter::Week => Some(now - Duration::days(7)),
            DateRangeFilter::Month => now.checked_sub_months(Months::new(1)),
        }
    }
}

impl FromStr for DateRangeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "all" => Ok(DateRangeFilter::All),
            "today" => Ok(DateRangeFilter::Today),
            "week" => Ok(DateRangeFilter::Week),
            "month" => Ok(DateRangeFilter::Month),
            _ => Err(anyhow::anyhow!("Invalid date range: {}", s)),
        }
    }
}

/// Search, emotion and date filters; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    /// Case-insensitive substring of the entry text
    pub search: Option<String>,
    /// Required primary emotion
    pub emotion: Option<String>,
    pub range: DateRangeFilter,
}

impl EntryFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.emotion.is_none() && self.range == DateRangeFilter::All
    }

    /// Entries passing every filter, in their original order
    pub fn apply(&self, entries: Vec<JournalEntryRecord>, now: DateTime<Utc>) -> Vec<JournalEntryRecord> {
        if self.is_empty() {
            return entries;
        }

        let search = self.search.as_ref().map(|s| s.to_lowercase());
        let cutoff = self.range.cutoff(now);

        entries
            .into_iter()
            .filter(|entry| {
                search
                    .as_ref()
                    .is_none_or(|term| entry.content.to_lowercase().contains(term))
            })
            .filter(|entry| {
                self.emotion
                    .as_ref()
                    .is_none_or(|emotion| entry.emotions.first() == Some(emotion))
            })
            .filter(|entry| cutoff.is_none_or(|cutoff| entry.timestamp >= cutoff))
            .collect()
    }
}
