//! Random field values used by the FOCUS transform.

use fake::Fake;
use fake::faker::address::en::CityName;
use fake::faker::job::en::Seniority;
use fake::faker::lorem::en::Sentence;
use rand::{Rng, RngCore};

pub const CHARGE_FREQUENCIES: &[&str] = &["Usage-Based", "Monthly", "One-Time"];
pub const PRICING_CATEGORIES: &[&str] = &["Standard", "Premium"];
pub const PRICING_UNITS: &[&str] = &["Requests", "GB", "Hours"];

/// Uniform value in `[0, scale)` rendered with two decimals.
pub fn amount(scale: f64, rng: &mut dyn RngCore) -> String {
    let value: f64 = rng.random::<f64>() * scale;
    format!("{value:.2}")
}

pub fn pick<'a, S: AsRef<str>>(values: &'a [S], rng: &mut dyn RngCore) -> Option<&'a str> {
    if values.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..values.len());
    values.get(idx).map(AsRef::as_ref)
}

pub fn city(rng: &mut dyn RngCore) -> String {
    CityName().fake_with_rng(rng)
}

pub fn job_descriptor(rng: &mut dyn RngCore) -> String {
    Seniority().fake_with_rng(rng)
}

pub fn sentence(words: usize, rng: &mut dyn RngCore) -> String {
    Sentence(words..words + 1).fake_with_rng(rng)
}
