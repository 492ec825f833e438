//! Public market endpoints fetched over plain HTTP: `exchangeInfo` and `ticker/24hr`.
//! Binance sends prices as numeric strings; they are normalized to `f64` on deserialization.

use {
    anyhow::{Context, Result},
    serde::Deserialize,
    std::{error::Error, fmt, time::Duration},
};

use crate::{
    config::{BINANCE, DF},
    data::GlobalRateLimiter,
    domain::TickerSnapshot,
};

pub(crate) mod string_or_float {
    use serde::{Deserialize, Deserializer, de};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrFloat {
            String(String),
            Float(f64),
        }

        match StringOrFloat::deserialize(deserializer)? {
            StringOrFloat::String(s) => s.parse().map_err(de::Error::custom),
            StringOrFloat::Float(f) => Ok(f),
        }
    }
}

#[derive(Debug)]
pub enum TickerError {
    Http(String),
    Status { code: u16, body: String },
    Parse(String),
}

impl fmt::Display for TickerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TickerError::Http(msg) => write!(f, "HTTP request failed: {}", msg),
            TickerError::Status { code, body } => write!(f, "HTTP {}: {}", code, body),
            TickerError::Parse(msg) => write!(f, "Unexpected payload: {}", msg),
        }
    }
}

impl Error for TickerError {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24hrWire {
    symbol: String,
    #[serde(with = "string_or_float")]
    last_price: f64,
    #[serde(with = "string_or_float")]
    open_price: f64,
    #[serde(with = "string_or_float")]
    price_change_percent: f64,
    #[serde(with = "string_or_float")]
    high_price: f64,
    #[serde(with = "string_or_float")]
    low_price: f64,
    #[serde(with = "string_or_float")]
    quote_volume: f64,
}

impl From<Ticker24hrWire> for TickerSnapshot {
    fn from(w: Ticker24hrWire) -> Self {
        TickerSnapshot {
            symbol: w.symbol,
            last_price: w.last_price,
            open_price: w.open_price,
            price_change_percent: w.price_change_percent,
            high_price: w.high_price,
            low_price: w.low_price,
            quote_volume: w.quote_volume,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoWire {
    symbols: Vec<SymbolInfoWire>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfoWire {
    pub symbol: String,
    pub status: String,
    pub quote_asset: String,
}

/// Tradable symbols quoted in `quote`, ranked by 24h quote volume (highest first), capped at `max`.
/// Symbols without a ticker sort last in exchange order.
pub fn select_symbols(
    infos: &[SymbolInfoWire],
    tickers: &[TickerSnapshot],
    quote: &str,
    max: usize,
) -> Vec<String> {
    let volume_of = |symbol: &str| {
        tickers
            .iter()
            .find(|t| t.symbol == symbol)
            .map_or(f64::NEG_INFINITY, |t| t.quote_volume)
    };
    let mut candidates: Vec<(&str, f64)> = infos
        .iter()
        .filter(|s| s.status == "TRADING" && s.quote_asset == quote)
        .map(|s| (s.symbol.as_str(), volume_of(&s.symbol)))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates
        .into_iter()
        .take(max)
        .map(|(s, _)| s.to_string())
        .collect()
}

pub(crate) fn parse_ticker(body: &str) -> Result<TickerSnapshot, TickerError> {
    serde_json::from_str::<Ticker24hrWire>(body)
        .map(TickerSnapshot::from)
        .map_err(|e| TickerError::Parse(e.to_string()))
}

pub(crate) fn parse_tickers(body: &str) -> Result<Vec<TickerSnapshot>, TickerError> {
    serde_json::from_str::<Vec<Ticker24hrWire>>(body)
        .map(|v| v.into_iter().map(TickerSnapshot::from).collect())
        .map_err(|e| TickerError::Parse(e.to_string()))
}

pub(crate) fn parse_exchange_info(body: &str) -> Result<Vec<SymbolInfoWire>, TickerError> {
    serde_json::from_str::<ExchangeInfoWire>(body)
        .map(|info| info.symbols)
        .map_err(|e| TickerError::Parse(e.to_string()))
}

/// Thin `reqwest` client over the public market endpoints.
#[derive(Clone)]
pub struct MarketRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl MarketRestClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(BINANCE.client.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: BINANCE.rest.base_url.to_string(),
        })
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, TickerError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| TickerError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TickerError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(TickerError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    pub async fn fetch_ticker(
        &self,
        symbol: &str,
        limiter: &GlobalRateLimiter,
    ) -> Result<TickerSnapshot> {
        limiter.acquire(BINANCE.limits.ticker_call_weight, symbol).await;
        let body = self
            .get_text(BINANCE.rest.ticker_24hr_path, &[("symbol", symbol)])
            .await
            .with_context(|| format!("ticker/24hr request failed for {}", symbol))?;
        let ticker = parse_ticker(&body).with_context(|| format!("ticker/24hr for {}", symbol))?;
        if DF.log_fetches {
            log::info!("Ticker {}: last {}", ticker.symbol, ticker.last_price);
        }
        Ok(ticker)
    }

    pub async fn fetch_all_tickers(&self, limiter: &GlobalRateLimiter) -> Result<Vec<TickerSnapshot>> {
        limiter
            .acquire(BINANCE.limits.all_tickers_call_weight, "ticker/24hr (all)")
            .await;
        let body = self
            .get_text(BINANCE.rest.ticker_24hr_path, &[])
            .await
            .context("ticker/24hr request failed")?;
        Ok(parse_tickers(&body)?)
    }

    pub async fn fetch_exchange_info(&self, limiter: &GlobalRateLimiter) -> Result<Vec<SymbolInfoWire>> {
        limiter
            .acquire(BINANCE.limits.exchange_info_call_weight, "exchangeInfo")
            .await;
        let body = self
            .get_text(BINANCE.rest.exchange_info_path, &[])
            .await
            .context("exchangeInfo request failed")?;
        Ok(parse_exchange_info(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKER_JSON: &str = r#"{
        "symbol": "BTCUSDT",
        "priceChange": "-94.99999800",
        "priceChangePercent": "-0.095",
        "weightedAvgPrice": "0.29628482",
        "prevClosePrice": "0.10002000",
        "lastPrice": "99905.01",
        "lastQty": "200.00000000",
        "openPrice": "100000.00",
        "highPrice": "100500.5",
        "lowPrice": "98000",
        "volume": "8913.30000000",
        "quoteVolume": "15.30000000",
        "openTime": 1499783499040,
        "closeTime": 1499869899040,
        "count": 76
    }"#;

    #[test]
    fn ticker_numeric_strings_are_normalized() {
        let t = parse_ticker(TICKER_JSON).unwrap();
        assert_eq!(t.symbol, "BTCUSDT");
        assert_eq!(t.last_price, 99905.01);
        assert_eq!(t.open_price, 100_000.0);
        assert_eq!(t.price_change_percent, -0.095);
        assert_eq!(t.low_price, 98_000.0);
        assert_eq!(t.quote_volume, 15.3);
    }

    #[test]
    fn ticker_accepts_plain_numbers_and_rejects_garbage() {
        let body = r#"{"symbol":"X","lastPrice":1.5,"openPrice":"1","priceChangePercent":"50",
            "highPrice":"2","lowPrice":"1","quoteVolume":"10"}"#;
        assert_eq!(parse_ticker(body).unwrap().last_price, 1.5);

        let bad = r#"{"symbol":"X","lastPrice":"abc","openPrice":"1","priceChangePercent":"0",
            "highPrice":"1","lowPrice":"1","quoteVolume":"1"}"#;
        assert!(matches!(parse_ticker(bad), Err(TickerError::Parse(_))));
    }

    #[test]
    fn symbols_are_filtered_and_ranked_by_volume() {
        let info = r#"{"timezone":"UTC","symbols":[
            {"symbol":"AAAUSDT","status":"TRADING","baseAsset":"AAA","quoteAsset":"USDT"},
            {"symbol":"BBBUSDT","status":"BREAK","baseAsset":"BBB","quoteAsset":"USDT"},
            {"symbol":"CCCBTC","status":"TRADING","baseAsset":"CCC","quoteAsset":"BTC"},
            {"symbol":"DDDUSDT","status":"TRADING","baseAsset":"DDD","quoteAsset":"USDT"},
            {"symbol":"EEEUSDT","status":"TRADING","baseAsset":"EEE","quoteAsset":"USDT"}
        ]}"#;
        let infos = parse_exchange_info(info).unwrap();
        let mut tickers = vec![
            TickerSnapshot::from_last_price("AAAUSDT", 1.0, 1.0),
            TickerSnapshot::from_last_price("DDDUSDT", 1.0, 1.0),
        ];
        tickers[0].quote_volume = 10.0;
        tickers[1].quote_volume = 500.0;

        assert_eq!(
            select_symbols(&infos, &tickers, "USDT", 10),
            vec!["DDDUSDT", "AAAUSDT", "EEEUSDT"]
        );
        assert_eq!(select_symbols(&infos, &tickers, "USDT", 1), vec!["DDDUSDT"]);
        assert_eq!(select_symbols(&infos, &[], "BTC", 10), vec!["CCCBTC"]);
    }
}
