use chrono::{DateTime, FixedOffset};

/// One row of the `fx_rates` table: `rate` KZT per 1 unit of `quote` at `as_of`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFxRate {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    /// Upstream snapshot time, not insertion time
    pub as_of: DateTime<FixedOffset>,
}
