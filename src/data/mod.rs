mod bn_kline;
mod market_rest;
mod provider;
mod rate_limiter;

pub use {
    bn_kline::{BNKline, BNKlineError},
    market_rest::{MarketRestClient, SymbolInfoWire, TickerError, select_symbols},
    provider::{BinanceProvider, MarketDataProvider},
    rate_limiter::GlobalRateLimiter,
};
