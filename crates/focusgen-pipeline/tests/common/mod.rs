#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::NaiveDate;
use focusgen_core::{EnrichmentContext, Header, PipelineConfig, Record};
use focusgen_pipeline::{PipelineError, RecordSink, RecordSource};
use rand::RngCore;

/// In-memory source yielding `count` single-field records.
pub struct VecSource {
    header: Header,
    rows: VecDeque<Record>,
}

impl VecSource {
    pub fn numbered(count: usize) -> Self {
        Self::new(
            Header::from(vec!["Id"]),
            (0..count).map(|i| Record::new(vec![i.to_string()])).collect(),
        )
    }

    pub fn new(header: Header, rows: Vec<Record>) -> Self {
        Self {
            header,
            rows: rows.into(),
        }
    }
}

impl RecordSource for VecSource {
    fn header(&self) -> &Header {
        &self.header
    }

    fn next_record(&mut self) -> Result<Option<Record>, PipelineError> {
        Ok(self.rows.pop_front())
    }
}

/// In-memory sink remembering every batch it was handed.
#[derive(Default)]
pub struct VecSink {
    pub header: Option<Header>,
    pub batches: Vec<Vec<Record>>,
    pub flushes: usize,
    pub fail_after_batches: Option<usize>,
}

impl VecSink {
    pub fn rows(&self) -> Vec<&Record> {
        self.batches.iter().flatten().collect()
    }

    pub fn non_empty_batch_sizes(&self) -> Vec<usize> {
        self.batches
            .iter()
            .map(Vec::len)
            .filter(|len| *len > 0)
            .collect()
    }
}

impl RecordSink for VecSink {
    fn write_header(&mut self, header: &Header) -> Result<(), PipelineError> {
        self.header = Some(header.clone());
        Ok(())
    }

    fn write_batch(&mut self, batch: &[Record]) -> Result<(), PipelineError> {
        if let Some(limit) = self.fail_after_batches
            && self.batches.len() >= limit
        {
            return Err(PipelineError::Io(std::io::Error::other("disk full")));
        }
        self.batches.push(batch.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Transform tagging each record with its provider and billing month.
pub fn tag_with_context(
    template: Record,
    ctx: &EnrichmentContext,
    _rng: &mut dyn RngCore,
) -> Record {
    let mut fields = template.into_fields();
    fields.push(ctx.provider.clone());
    fields.push(ctx.period_start_text());
    Record::new(fields)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| panic!("invalid date {y}-{m}-{d}"))
}

/// Config for 2024-07-01 .. 2024-12-31 (six months) with four providers.
pub fn config(rows_per_provider: u64, workers: usize, batch_size: usize) -> PipelineConfig {
    let mut config = PipelineConfig::new(
        "unused.csv",
        "unused.csv",
        date(2024, 7, 1),
        date(2024, 12, 31),
    );
    config.rows_per_provider = rows_per_provider;
    config.workers = workers;
    config.batch_size = batch_size;
    config.seed = Some(42);
    config
}

pub fn temp_path(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("focusgen_pipeline_{label}_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
