use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// Format used for billing period columns.
pub const PERIOD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Month boundaries in `[start, end)`, one per whole calendar month.
///
/// Each boundary is computed from `start` directly, so a start on the 31st
/// clamps per month instead of drifting after February.
pub fn month_boundaries(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDateTime> {
    let mut boundaries = Vec::new();
    let mut offset = 0u32;
    while let Some(date) = start.checked_add_months(Months::new(offset)) {
        if date >= end {
            break;
        }
        boundaries.push(date.and_time(NaiveTime::MIN));
        offset += 1;
    }
    boundaries
}

/// Per-work-item enrichment inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentContext {
    pub provider: String,
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
}

impl EnrichmentContext {
    /// Context covering one calendar month starting at `boundary`.
    pub fn for_month(provider: impl Into<String>, boundary: NaiveDateTime) -> Self {
        let period_end = boundary
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDateTime::MAX);
        Self {
            provider: provider.into(),
            period_start: boundary,
            period_end,
        }
    }

    pub fn period_start_text(&self) -> String {
        self.period_start.format(PERIOD_FORMAT).to_string()
    }

    pub fn period_end_text(&self) -> String {
        self.period_end.format(PERIOD_FORMAT).to_string()
    }
}

/// The (month x provider x rows) plan every worker walks.
#[derive(Debug, Clone)]
pub struct Schedule {
    months: Vec<NaiveDateTime>,
    providers: Vec<String>,
    rows_per_worker: u64,
    workers: usize,
}

impl Schedule {
    pub fn new(config: &PipelineConfig) -> Self {
        let workers = config.workers.max(1);
        Self {
            months: month_boundaries(config.start_date, config.end_date),
            providers: config.providers.clone(),
            rows_per_worker: config.rows_per_provider / workers as u64,
            workers,
        }
    }

    pub fn months(&self) -> &[NaiveDateTime] {
        &self.months
    }

    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Rows each worker pulls per (month, provider) pair.
    pub fn rows_per_worker(&self) -> u64 {
        self.rows_per_worker
    }

    /// Rows the whole pool asks for if the source never runs dry.
    pub fn demand(&self) -> u64 {
        self.months.len() as u64
            * self.providers.len() as u64
            * self.rows_per_worker
            * self.workers as u64
    }

    /// Contexts in worker order: month, then provider.
    pub fn contexts(&self) -> impl Iterator<Item = (EnrichmentContext, u64)> + '_ {
        self.months.iter().flat_map(move |boundary| {
            self.providers.iter().map(move |provider| {
                (
                    EnrichmentContext::for_month(provider.clone(), *boundary),
                    self.rows_per_worker,
                )
            })
        })
    }
}
