use focusgen_core::{EnrichmentContext, Header, Record};
use rand::RngCore;

use crate::errors::PipelineError;
use crate::transform::Transform;
use crate::transform::values::{
    CHARGE_FREQUENCIES, PRICING_CATEGORIES, PRICING_UNITS, amount, city, job_descriptor, pick,
    sentence,
};

/// FOCUS billing columns overwritten during enrichment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusColumn {
    ProviderName,
    BillingPeriodStart,
    BillingPeriodEnd,
    BilledCost,
    ConsumedQuantity,
    ServiceName,
    RegionName,
    ChargeCategory,
    ChargeDescription,
    ChargeFrequency,
    ContractedCost,
    EffectiveCost,
    InvoiceIssuerName,
    ListCost,
    ListUnitPrice,
    PricingCategory,
    PricingQuantity,
    PricingUnit,
    PublisherName,
}

const COLUMN_COUNT: usize = 19;

impl FocusColumn {
    pub const ALL: [FocusColumn; COLUMN_COUNT] = [
        FocusColumn::ProviderName,
        FocusColumn::BillingPeriodStart,
        FocusColumn::BillingPeriodEnd,
        FocusColumn::BilledCost,
        FocusColumn::ConsumedQuantity,
        FocusColumn::ServiceName,
        FocusColumn::RegionName,
        FocusColumn::ChargeCategory,
        FocusColumn::ChargeDescription,
        FocusColumn::ChargeFrequency,
        FocusColumn::ContractedCost,
        FocusColumn::EffectiveCost,
        FocusColumn::InvoiceIssuerName,
        FocusColumn::ListCost,
        FocusColumn::ListUnitPrice,
        FocusColumn::PricingCategory,
        FocusColumn::PricingQuantity,
        FocusColumn::PricingUnit,
        FocusColumn::PublisherName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FocusColumn::ProviderName => "ProviderName",
            FocusColumn::BillingPeriodStart => "BillingPeriodStart",
            FocusColumn::BillingPeriodEnd => "BillingPeriodEnd",
            FocusColumn::BilledCost => "BilledCost",
            FocusColumn::ConsumedQuantity => "ConsumedQuantity",
            FocusColumn::ServiceName => "ServiceName",
            FocusColumn::RegionName => "RegionName",
            FocusColumn::ChargeCategory => "ChargeCategory",
            FocusColumn::ChargeDescription => "ChargeDescription",
            FocusColumn::ChargeFrequency => "ChargeFrequency",
            FocusColumn::ContractedCost => "ContractedCost",
            FocusColumn::EffectiveCost => "EffectiveCost",
            FocusColumn::InvoiceIssuerName => "InvoiceIssuerName",
            FocusColumn::ListCost => "ListCost",
            FocusColumn::ListUnitPrice => "ListUnitPrice",
            FocusColumn::PricingCategory => "PricingCategory",
            FocusColumn::PricingQuantity => "PricingQuantity",
            FocusColumn::PricingUnit => "PricingUnit",
            FocusColumn::PublisherName => "PublisherName",
        }
    }

    /// Position in the reference FOCUS export.
    fn default_position(self) -> usize {
        match self {
            FocusColumn::ProviderName => 2,
            FocusColumn::BillingPeriodStart => 5,
            FocusColumn::BillingPeriodEnd => 6,
            FocusColumn::BilledCost => 8,
            FocusColumn::ConsumedQuantity => 18,
            FocusColumn::ServiceName => 20,
            FocusColumn::RegionName => 21,
            FocusColumn::ChargeCategory => 22,
            FocusColumn::ChargeDescription => 23,
            FocusColumn::ChargeFrequency => 24,
            FocusColumn::ContractedCost => 25,
            FocusColumn::EffectiveCost => 26,
            FocusColumn::InvoiceIssuerName => 27,
            FocusColumn::ListCost => 28,
            FocusColumn::ListUnitPrice => 29,
            FocusColumn::PricingCategory => 30,
            FocusColumn::PricingQuantity => 31,
            FocusColumn::PricingUnit => 32,
            FocusColumn::PublisherName => 33,
        }
    }
}

/// Positions of the enriched columns within a template record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusLayout {
    positions: [usize; COLUMN_COUNT],
}

impl Default for FocusLayout {
    fn default() -> Self {
        Self {
            positions: FocusColumn::ALL.map(FocusColumn::default_position),
        }
    }
}

impl FocusLayout {
    /// Resolve columns by header name, or fall back to the reference
    /// positions when the header carries none of the FOCUS names.
    pub fn from_header(header: &Header) -> Result<Self, PipelineError> {
        let found: Vec<Option<usize>> = FocusColumn::ALL
            .iter()
            .map(|column| header.position(column.name()))
            .collect();

        let layout = if found.iter().all(Option::is_some) {
            let mut positions = [0usize; COLUMN_COUNT];
            for (slot, position) in positions.iter_mut().zip(found.iter().flatten()) {
                *slot = *position;
            }
            Self { positions }
        } else if found.iter().all(Option::is_none) {
            Self::default()
        } else {
            let missing: Vec<&str> = FocusColumn::ALL
                .iter()
                .zip(&found)
                .filter(|(_, position)| position.is_none())
                .map(|(column, _)| column.name())
                .collect();
            return Err(PipelineError::Layout(format!(
                "header is missing FOCUS columns: {}",
                missing.join(", ")
            )));
        };

        layout.check_arity(header.len())?;
        Ok(layout)
    }

    pub fn position(&self, column: FocusColumn) -> usize {
        self.positions[column as usize]
    }

    /// Smallest record length that holds every enriched column.
    pub fn min_arity(&self) -> usize {
        self.positions.iter().max().map_or(0, |max| max + 1)
    }

    pub fn check_arity(&self, len: usize) -> Result<(), PipelineError> {
        let required = self.min_arity();
        if len < required {
            return Err(PipelineError::Layout(format!(
                "template has {len} fields, layout needs at least {required}"
            )));
        }
        Ok(())
    }
}

/// Enriches FOCUS billing rows for one (provider, billing month) context.
#[derive(Clone, Debug)]
pub struct FocusTransform {
    layout: FocusLayout,
    providers: Vec<String>,
}

impl FocusTransform {
    pub fn new(layout: FocusLayout, providers: Vec<String>) -> Self {
        Self { layout, providers }
    }

    fn put(&self, record: &mut Record, column: FocusColumn, value: impl Into<String>) {
        let written = record.set(self.layout.position(column), value);
        debug_assert!(written, "record too short for {}", column.name());
    }
}

impl Transform for FocusTransform {
    fn check_header(&self, header: &Header) -> Result<(), PipelineError> {
        self.layout.check_arity(header.len())
    }

    fn apply(&self, template: Record, ctx: &EnrichmentContext, rng: &mut dyn RngCore) -> Record {
        let mut record = template;
        let provider = ctx.provider.as_str();

        self.put(&mut record, FocusColumn::ProviderName, provider);
        self.put(&mut record, FocusColumn::BillingPeriodStart, ctx.period_start_text());
        self.put(&mut record, FocusColumn::BillingPeriodEnd, ctx.period_end_text());
        self.put(&mut record, FocusColumn::BilledCost, amount(100.0, rng));
        self.put(&mut record, FocusColumn::ConsumedQuantity, amount(1000.0, rng));
        let service = pick(&self.providers, rng).unwrap_or(provider).to_string();
        self.put(&mut record, FocusColumn::ServiceName, service);
        self.put(&mut record, FocusColumn::RegionName, city(rng));
        self.put(&mut record, FocusColumn::ChargeCategory, job_descriptor(rng));
        self.put(&mut record, FocusColumn::ChargeDescription, sentence(6, rng));
        let frequency = pick(CHARGE_FREQUENCIES, rng).unwrap_or_default();
        self.put(&mut record, FocusColumn::ChargeFrequency, frequency);
        self.put(&mut record, FocusColumn::ContractedCost, amount(100.0, rng));
        self.put(&mut record, FocusColumn::EffectiveCost, amount(100.0, rng));
        self.put(&mut record, FocusColumn::InvoiceIssuerName, provider);
        self.put(&mut record, FocusColumn::ListCost, amount(100.0, rng));
        self.put(&mut record, FocusColumn::ListUnitPrice, amount(100.0, rng));
        let category = pick(PRICING_CATEGORIES, rng).unwrap_or_default();
        self.put(&mut record, FocusColumn::PricingCategory, category);
        self.put(&mut record, FocusColumn::PricingQuantity, amount(10.0, rng));
        let unit = pick(PRICING_UNITS, rng).unwrap_or_default();
        self.put(&mut record, FocusColumn::PricingUnit, unit);
        self.put(&mut record, FocusColumn::PublisherName, provider);

        record
    }
}
