// File: src/services/rates/fetcher.rs
use super::errors::{FetchCause, FetchError, FetchStage};
use super::models::{KztRates, QuoteCurrency, QuoteSet, snapshot_offset};
use super::sources::{CryptoPriceSource, FiatQuote, FiatRateSource};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Combines the fiat and crypto providers into one [`QuoteSet`].
pub struct RateFetcher {
    fiat: Arc<dyn FiatRateSource>,
    crypto: Arc<dyn CryptoPriceSource>,
}

impl RateFetcher {
    pub fn new(fiat: Arc<dyn FiatRateSource>, crypto: Arc<dyn CryptoPriceSource>) -> Self {
        Self { fiat, crypto }
    }

    /// Queries both providers concurrently.
    ///
    /// Any fiat problem fails the whole fetch; a crypto problem only leaves
    /// `btc_usd` empty.
    pub async fn fetch(&self) -> Result<QuoteSet, FetchError> {
        debug!("Fetching fiat rates and BTC price");

        // Both providers at once, each bounded by the client timeout
        let (fiat, crypto) = tokio::join!(self.fiat.latest(), self.crypto.btc_usd());

        // Fiat is mandatory
        let fiat = fiat.map_err(|cause| FetchError::new(FetchStage::Fiat, cause))?;
        let (as_of, rates) =
            normalize_fiat(&fiat).map_err(|cause| FetchError::new(FetchStage::Fiat, cause))?;

        // BTC is optional
        let btc_usd = match crypto {
            Ok(price) => Some(price),
            Err(cause) => {
                warn!("{}; continuing without BTC price", FetchError::new(FetchStage::Crypto, cause));
                None
            }
        };

        info!(
            "Fetched rates as of {}: USD {:.2}, EUR {:.2}, RUB {:.2}, BTC {:?}",
            as_of, rates.usd, rates.eur, rates.rub, btc_usd
        );

        Ok(QuoteSet {
            as_of,
            rates,
            btc_usd,
        })
    }
}

/// Converts quote-per-KZT rates into KZT-per-quote and stamps them at +05:00.
pub fn normalize_fiat(fiat: &FiatQuote) -> Result<(DateTime<FixedOffset>, KztRates), FetchCause> {
    let as_of = DateTime::from_timestamp(fiat.time_last_update_unix, 0)
        .ok_or(FetchCause::InvalidTimestamp(fiat.time_last_update_unix))?
        .with_timezone(&snapshot_offset());

    // Provider quotes foreign currency per KZT, the bot shows KZT per unit
    let rates = KztRates {
        usd: kzt_per_unit(fiat, QuoteCurrency::Usd)?,
        eur: kzt_per_unit(fiat, QuoteCurrency::Eur)?,
        rub: kzt_per_unit(fiat, QuoteCurrency::Rub)?,
    };

    Ok((as_of, rates))
}

fn kzt_per_unit(fiat: &FiatQuote, currency: QuoteCurrency) -> Result<f64, FetchCause> {
    let code = currency.code();
    let value = *fiat
        .conversion_rates
        .get(code)
        .ok_or(FetchCause::MissingRate(code))?;

    // Zero, negative or NaN rates would produce nonsense reciprocals
    let rate = 1.0 / value;
    if !(value.is_finite() && value > 0.0 && rate.is_finite()) {
        return Err(FetchCause::InvalidRate { code, value });
    }

    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockCryptoSource, MockFiatSource, fiat_quote, sample_fiat_quote};

    fn fetcher(fiat: MockFiatSource, crypto: MockCryptoSource) -> RateFetcher {
        RateFetcher::new(Arc::new(fiat), Arc::new(crypto))
    }

    fn fiat_returning(quote: FiatQuote) -> MockFiatSource {
        let mut fiat = MockFiatSource::new();
        fiat.expect_latest().times(1).returning(move || Ok(quote.clone()));
        fiat
    }

    fn crypto_returning(price: f64) -> MockCryptoSource {
        let mut crypto = MockCryptoSource::new();
        crypto.expect_btc_usd().times(1).returning(move || Ok(price));
        crypto
    }

    #[tokio::test]
    async fn test_rates_are_reciprocals() {
        let raw = sample_fiat_quote();
        let quote = fetcher(fiat_returning(raw.clone()), crypto_returning(43000.0))
            .fetch()
            .await
            .unwrap();

        for (currency, rate) in quote.rates.iter() {
            let upstream = raw.conversion_rates[currency.code()];
            assert!((rate - 1.0 / upstream).abs() < 1e-9, "{} rate {}", currency, rate);
        }
        assert_eq!(quote.btc_usd, Some(43000.0));
    }

    #[tokio::test]
    async fn test_timestamp_has_fixed_plus_five_offset() {
        let quote = fetcher(fiat_returning(sample_fiat_quote()), crypto_returning(43000.0))
            .fetch()
            .await
            .unwrap();

        assert_eq!(quote.as_of.offset().local_minus_utc(), 5 * 3600);
        assert_eq!(quote.as_of.timestamp(), 1700000000);
        assert_eq!(quote.as_of.to_rfc3339(), "2023-11-15T03:13:20+05:00");
    }

    #[tokio::test]
    async fn test_crypto_failure_degrades_to_empty_btc() {
        let mut crypto = MockCryptoSource::new();
        crypto
            .expect_btc_usd()
            .times(1)
            .returning(|| Err(FetchCause::Status(429)));

        let quote = fetcher(fiat_returning(sample_fiat_quote()), crypto).fetch().await.unwrap();

        assert_eq!(quote.btc_usd, None);
        assert!((quote.rates.usd - 476.190476).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_missing_fiat_rate_fails_whole_fetch() {
        let raw = fiat_quote(&[("USD", 0.0021), ("RUB", 0.18)], 1700000000);

        let err = fetcher(fiat_returning(raw), crypto_returning(43000.0))
            .fetch()
            .await
            .unwrap_err();

        assert_eq!(err.stage, FetchStage::Fiat);
        assert!(matches!(err.cause, FetchCause::MissingRate("EUR")));
    }

    #[tokio::test]
    async fn test_zero_fiat_rate_fails_whole_fetch() {
        let raw = fiat_quote(&[("USD", 0.0021), ("EUR", 0.0019), ("RUB", 0.0)], 1700000000);

        let err = fetcher(fiat_returning(raw), crypto_returning(43000.0))
            .fetch()
            .await
            .unwrap_err();

        assert_eq!(err.stage, FetchStage::Fiat);
        assert!(matches!(err.cause, FetchCause::InvalidRate { code: "RUB", .. }));
    }

    #[tokio::test]
    async fn test_fiat_provider_error_is_fatal_even_with_btc_price() {
        let mut fiat = MockFiatSource::new();
        fiat.expect_latest()
            .times(1)
            .returning(|| Err(FetchCause::Status(503)));

        let err = fetcher(fiat, crypto_returning(43000.0)).fetch().await.unwrap_err();

        assert_eq!(err.stage, FetchStage::Fiat);
        assert!(matches!(err.cause, FetchCause::Status(503)));
        assert_eq!(err.to_string(), "fiat fetch failed: unexpected status 503");
    }

    #[test]
    fn test_normalize_rejects_out_of_range_timestamp() {
        let raw = fiat_quote(&[("USD", 0.0021), ("EUR", 0.0019), ("RUB", 0.18)], i64::MAX);
        assert!(matches!(normalize_fiat(&raw), Err(FetchCause::InvalidTimestamp(_))));
    }

    #[test]
    fn test_normalize_rejects_negative_rate() {
        let raw = fiat_quote(&[("USD", -0.0021), ("EUR", 0.0019), ("RUB", 0.18)], 1700000000);
        assert!(matches!(
            normalize_fiat(&raw),
            Err(FetchCause::InvalidRate { code: "USD", .. })
        ));
    }
}
