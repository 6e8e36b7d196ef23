//! Mocks and fixtures shared by the unit tests.

use crate::db::postgres::errors::StoreError;
use crate::db::postgres::models::fx_rate::NewFxRate;
use crate::db::postgres::models::user::NewUser;
use crate::db::postgres::repository::fx_rate_repository::TraitFxRateRepository;
use crate::db::postgres::repository::user_repository::TraitUserRepository;
use crate::services::notifications::sink::{DispatchCause, NotificationSink, ReplyKeyboard};
use crate::services::rates::errors::FetchCause;
use crate::services::rates::fetcher::normalize_fiat;
use crate::services::rates::models::QuoteSet;
use crate::services::rates::sources::{CryptoPriceSource, FiatQuote, FiatRateSource};
use async_trait::async_trait;
use mockall::mock;
use std::collections::HashMap;

mock! {
    pub FiatSource {}

    #[async_trait]
    impl FiatRateSource for FiatSource {
        async fn latest(&self) -> Result<FiatQuote, FetchCause>;
    }
}

mock! {
    pub CryptoSource {}

    #[async_trait]
    impl CryptoPriceSource for CryptoSource {
        async fn btc_usd(&self) -> Result<f64, FetchCause>;
    }
}

mock! {
    pub FxRateRepository {}

    #[async_trait]
    impl TraitFxRateRepository for FxRateRepository {
        async fn insert_snapshot(&self, rows: &[NewFxRate]) -> Result<u64, StoreError>;
    }
}

mock! {
    pub UserRepository {}

    #[async_trait]
    impl TraitUserRepository for UserRepository {
        async fn register(&self, user: &NewUser) -> Result<bool, sqlx::Error>;
    }
}

mock! {
    pub Sink {}

    #[async_trait]
    impl NotificationSink for Sink {
        async fn send_message(
            &self,
            chat_id: &str,
            text: &str,
            keyboard: Option<ReplyKeyboard>,
        ) -> Result<(), DispatchCause>;
    }
}

pub fn fiat_quote(rates: &[(&str, f64)], time_last_update_unix: i64) -> FiatQuote {
    FiatQuote {
        time_last_update_unix,
        conversion_rates: rates
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect::<HashMap<_, _>>(),
    }
}

/// The reference quote: USD 0.0021, EUR 0.0019, RUB 0.18 per KZT at 1700000000.
pub fn sample_fiat_quote() -> FiatQuote {
    fiat_quote(&[("USD", 0.0021), ("EUR", 0.0019), ("RUB", 0.18)], 1700000000)
}

pub fn sample_quote_set(btc_usd: Option<f64>) -> QuoteSet {
    let (as_of, rates) = normalize_fiat(&sample_fiat_quote()).expect("sample quote is valid");
    QuoteSet {
        as_of,
        rates,
        btc_usd,
    }
}
