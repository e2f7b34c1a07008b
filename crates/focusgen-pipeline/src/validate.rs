//! Sanity checks for a generated FOCUS CSV.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use focusgen_core::{DEFAULT_PROVIDERS, PERIOD_FORMAT, Record};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::source::RecordSource;
use crate::source::csv::CsvRecordSource;

/// Columns a FOCUS export is expected to carry.
pub const EXPECTED_COLUMNS: &[&str] = &[
    "AvailabilityZone",
    "BilledCost",
    "BillingAccountId",
    "BillingAccountName",
    "BillingCurrency",
    "BillingPeriodEnd",
    "BillingPeriodStart",
    "ChargeCategory",
    "ChargeClass",
    "ChargeDescription",
    "ChargeFrequency",
    "ChargePeriodEnd",
    "ChargePeriodStart",
    "CommitmentDiscountCategory",
    "CommitmentDiscountId",
    "CommitmentDiscountName",
    "CommitmentDiscountStatus",
    "CommitmentDiscountType",
    "ConsumedQuantity",
    "ConsumedUnit",
    "ContractedCost",
    "ContractedUnitPrice",
    "EffectiveCost",
    "InvoiceIssuerName",
    "ListCost",
    "ListUnitPrice",
    "PricingCategory",
    "PricingQuantity",
    "PricingUnit",
    "ProviderName",
    "PublisherName",
    "RegionId",
    "RegionName",
    "ResourceId",
    "ResourceName",
    "ResourceType",
    "ServiceCategory",
    "Id",
    "ServiceName",
    "SkuId",
    "SkuPriceId",
    "SubAccountId",
    "SubAccountName",
    "Tags",
];

/// What to check and how many rows to sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateOptions {
    /// Rows drawn uniformly from the whole file.
    pub sample_size: usize,
    /// Fixes the sample; a random one is drawn when unset.
    pub seed: Option<u64>,
    pub expected_columns: Vec<String>,
    pub providers: Vec<String>,
    /// Generation window `[start, end)`; billing periods must fall inside it.
    pub window: Option<(NaiveDate, NaiveDate)>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            sample_size: 2000,
            seed: None,
            expected_columns: EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            providers: DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            window: None,
        }
    }
}

/// Outcome of one validation check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Report for a validated file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rows_scanned: u64,
    pub rows_sampled: u64,
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(|check| !check.passed)
    }

    fn push(&mut self, name: &str, failure: Option<String>) {
        self.checks.push(ValidationCheck {
            name: name.to_string(),
            passed: failure.is_none(),
            detail: failure,
        });
    }
}

/// Validate a generated CSV against a random sample of its rows.
pub fn validate_output(
    path: &Path,
    options: &ValidateOptions,
) -> Result<ValidationReport, PipelineError> {
    let mut source = CsvRecordSource::open(path)?;
    validate_source(&mut source, options)
}

pub fn validate_source<S: RecordSource + ?Sized>(
    source: &mut S,
    options: &ValidateOptions,
) -> Result<ValidationReport, PipelineError> {
    let header = source.header().clone();
    let mut report = ValidationReport {
        rows_scanned: 0,
        rows_sampled: 0,
        checks: Vec::new(),
    };

    let missing: Vec<&str> = options
        .expected_columns
        .iter()
        .map(String::as_str)
        .filter(|column| header.position(column).is_none())
        .collect();
    report.push(
        "columns",
        (!missing.is_empty()).then(|| format!("missing columns: {}", missing.join(", "))),
    );

    let start_idx = header.position("BillingPeriodStart");
    let end_idx = header.position("BillingPeriodEnd");
    let provider_idx = header.position("ProviderName");
    let bounds = options.window.map(|(start, end)| {
        (
            start.and_time(NaiveTime::MIN),
            end.checked_add_months(Months::new(1))
                .unwrap_or(end)
                .and_time(NaiveTime::MIN),
        )
    });

    let sample = reservoir_sample(source, options, &mut report)?;

    let mut bad_dates = 0u64;
    let mut out_of_window = 0u64;
    let mut seen_providers = BTreeSet::new();
    for record in &sample {
        let start = start_idx.and_then(|i| record.get(i)).and_then(parse_period);
        let end = end_idx.and_then(|i| record.get(i)).and_then(parse_period);
        match (start, end) {
            (Some(start), Some(end)) => {
                if let Some((lower, upper)) = bounds
                    && (start < lower || end > upper)
                {
                    out_of_window += 1;
                }
            }
            _ => bad_dates += 1,
        }

        if let Some(provider) = provider_idx.and_then(|i| record.get(i)) {
            seen_providers.insert(provider.to_string());
        }
    }

    report.push(
        "billing_period_format",
        (bad_dates > 0)
            .then(|| format!("{bad_dates} rows with missing or invalid billing periods")),
    );
    if let Some((start, end)) = options.window {
        report.push(
            "billing_period_window",
            (out_of_window > 0)
                .then(|| format!("{out_of_window} rows outside {start} .. {end} (+1 month)")),
        );
    }

    let absent: Vec<&str> = options
        .providers
        .iter()
        .map(String::as_str)
        .filter(|provider| !seen_providers.contains(*provider))
        .collect();
    report.push(
        "providers",
        (!absent.is_empty()).then(|| format!("providers not represented: {}", absent.join(", "))),
    );

    report.push(
        "non_empty",
        (report.rows_scanned == 0).then(|| "file contains no rows".to_string()),
    );

    Ok(report)
}

/// Keep a uniform sample of `sample_size` rows while scanning the whole
/// source once (Algorithm R).
fn reservoir_sample<S: RecordSource + ?Sized>(
    source: &mut S,
    options: &ValidateOptions,
    report: &mut ValidationReport,
) -> Result<Vec<Record>, PipelineError> {
    let capacity = options.sample_size;
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed.unwrap_or_else(rand::random));
    let mut sample = Vec::with_capacity(capacity.min(1 << 16));

    while let Some(record) = source.next_record()? {
        report.rows_scanned += 1;
        if sample.len() < capacity {
            sample.push(record);
        } else {
            let slot = rng.random_range(0..report.rows_scanned);
            if let Some(kept) = usize::try_from(slot).ok().and_then(|i| sample.get_mut(i)) {
                *kept = record;
            }
        }
    }

    report.rows_sampled = sample.len() as u64;
    Ok(sample)
}

fn parse_period(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, PERIOD_FORMAT).ok()
}
