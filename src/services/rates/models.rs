use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

/// Base currency of every stored rate.
pub const BASE_CURRENCY: &str = "KZT";

/// Upstream timestamps are rendered and stored at a fixed +05:00, independent
/// of the host timezone.
const SNAPSHOT_OFFSET_SECONDS: i32 = 5 * 3600;

pub fn snapshot_offset() -> FixedOffset {
    FixedOffset::east_opt(SNAPSHOT_OFFSET_SECONDS).expect("+05:00 is a valid UTC offset")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum QuoteCurrency {
    Usd,
    Eur,
    Rub,
}

impl QuoteCurrency {
    pub const ALL: [QuoteCurrency; 3] = [QuoteCurrency::Usd, QuoteCurrency::Eur, QuoteCurrency::Rub];

    pub fn code(&self) -> &'static str {
        match self {
            QuoteCurrency::Usd => "USD",
            QuoteCurrency::Eur => "EUR",
            QuoteCurrency::Rub => "RUB",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            QuoteCurrency::Usd => "🇺🇸",
            QuoteCurrency::Eur => "🇪🇺",
            QuoteCurrency::Rub => "🇷🇺",
        }
    }
}

impl fmt::Display for QuoteCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// KZT per 1 unit of each quote currency. All three are always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KztRates {
    pub usd: f64,
    pub eur: f64,
    pub rub: f64,
}

impl KztRates {
    pub fn get(&self, currency: QuoteCurrency) -> f64 {
        match currency {
            QuoteCurrency::Usd => self.usd,
            QuoteCurrency::Eur => self.eur,
            QuoteCurrency::Rub => self.rub,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuoteCurrency, f64)> + '_ {
        QuoteCurrency::ALL.into_iter().map(move |currency| (currency, self.get(currency)))
    }
}

/// The normalized result of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSet {
    pub as_of: DateTime<FixedOffset>,
    pub rates: KztRates,
    /// Missing when the crypto provider failed; the fiat rates stay valid.
    pub btc_usd: Option<f64>,
}
