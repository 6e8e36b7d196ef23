// File: src/services/rates/sources.rs
use super::errors::FetchCause;
use super::models::BASE_CURRENCY;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Raw fiat snapshot: `conversion_rates` are units of quote currency per 1 KZT.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FiatQuote {
    pub time_last_update_unix: i64,
    pub conversion_rates: HashMap<String, f64>,
}

#[async_trait]
pub trait FiatRateSource: Send + Sync {
    async fn latest(&self) -> Result<FiatQuote, FetchCause>;
}

#[async_trait]
pub trait CryptoPriceSource: Send + Sync {
    /// Price of 1 BTC in USD
    async fn btc_usd(&self) -> Result<f64, FetchCause>;
}

/// exchangerate-api.com v6: `GET {base}/{token}/latest/KZT`
pub struct ExchangeRateApiSource {
    client: Client,
    base_url: String,
    token: String,
}

impl ExchangeRateApiSource {
    pub fn new(client: Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl FiatRateSource for ExchangeRateApiSource {
    async fn latest(&self) -> Result<FiatQuote, FetchCause> {
        // The token is part of the path, so the URL itself is never logged.
        debug!("Requesting {} conversion rates from exchangerate-api", BASE_CURRENCY);

        let url = format!("{}/{}/latest/{}", self.base_url, self.token, BASE_CURRENCY);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_fiat_response(&body)
    }
}

pub fn parse_fiat_response(body: &[u8]) -> Result<FiatQuote, FetchCause> {
    Ok(serde_json::from_slice(body)?)
}

/// CoinGecko `/simple/price?ids=bitcoin&vs_currencies=usd`
pub struct CoinGeckoSource {
    client: Client,
    url: String,
}

impl CoinGeckoSource {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: Option<CoinPrice>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    usd: Option<f64>,
}

#[async_trait]
impl CryptoPriceSource for CoinGeckoSource {
    async fn btc_usd(&self) -> Result<f64, FetchCause> {
        debug!("Requesting BTC/USD price from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .query(&[("ids", "bitcoin"), ("vs_currencies", "usd")])
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_crypto_response(&body)
    }
}

pub fn parse_crypto_response(body: &[u8]) -> Result<f64, FetchCause> {
    let parsed: SimplePriceResponse = serde_json::from_slice(body)?;

    parsed
        .bitcoin
        .and_then(|coin| coin.usd)
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or(FetchCause::MissingPrice)
}
