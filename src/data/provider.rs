use {
    anyhow::Result,
    async_trait::async_trait,
    binance_sdk::spot::rest_api::RestApi,
};

use crate::{
    config::BINANCE,
    data::{
        GlobalRateLimiter,
        bn_kline::{configure_binance_client, interval_for, load_klines, session_interval_for},
        market_rest::{MarketRestClient, select_symbols},
    },
    domain::{Candle, PairInterval, TickerSnapshot, Timeframe},
};

/// Abstract interface for fetching market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Tradable symbols quoted in `quote`, at most `max`.
    async fn fetch_symbols(&self, quote: &str, max: usize) -> Result<Vec<String>>;

    /// The most recent `limit` candles, oldest first.
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe, limit: i32)
    -> Result<Vec<Candle>>;

    /// Recent intraday candles, finer than `timeframe`, for the session detectors. Oldest first.
    async fn fetch_session_candles(&self, symbol: &str, timeframe: Timeframe)
    -> Result<Vec<Candle>>;

    async fn fetch_ticker(&self, symbol: &str) -> Result<TickerSnapshot>;
}

pub struct BinanceProvider {
    limiter: GlobalRateLimiter,
    rest_client: RestApi,
    market: MarketRestClient,
}

impl BinanceProvider {
    pub fn new(limiter: GlobalRateLimiter) -> Result<Self> {
        Ok(Self {
            limiter,
            rest_client: configure_binance_client()?,
            market: MarketRestClient::new()?,
        })
    }

    pub fn with_default_limits() -> Result<Self> {
        Self::new(GlobalRateLimiter::new(BINANCE.limits.weight_limit_minute))
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    async fn fetch_symbols(&self, quote: &str, max: usize) -> Result<Vec<String>> {
        let infos = self.market.fetch_exchange_info(&self.limiter).await?;
        let tickers = self.market.fetch_all_tickers(&self.limiter).await?;
        let symbols = select_symbols(&infos, &tickers, quote, max);
        log::info!(
            "Discovered {} {} symbols (of {} listed)",
            symbols.len(),
            quote,
            infos.len()
        );
        Ok(symbols)
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: i32,
    ) -> Result<Vec<Candle>> {
        let pair_interval = PairInterval::new(symbol, timeframe);
        load_klines(
            &self.rest_client,
            &pair_interval,
            interval_for(timeframe),
            limit,
            &self.limiter,
        )
        .await
    }

    async fn fetch_session_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>> {
        let pair_interval = PairInterval::new(symbol, timeframe);
        load_klines(
            &self.rest_client,
            &pair_interval,
            session_interval_for(timeframe),
            BINANCE.limits.session_klines_limit,
            &self.limiter,
        )
        .await
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<TickerSnapshot> {
        self.market.fetch_ticker(symbol, &self.limiter).await
    }
}
