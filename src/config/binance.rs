pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// REST constraints: rolling kline window, weight budget, call costs, and batch concurrency.
pub struct RestLimits {
    pub klines_limit: i32,
    /// Intraday klines per symbol for the session detectors. 1000 x 15m spans ten days.
    pub session_klines_limit: i32,
    pub weight_limit_minute: u32,
    pub kline_call_weight: u32,
    pub ticker_call_weight: u32,
    /// `ticker/24hr` without a symbol returns every pair and costs far more.
    pub all_tickers_call_weight: u32,
    pub exchange_info_call_weight: u32,
    pub batch_size: usize,
}

pub struct RestEndpoints {
    pub base_url: &'static str,
    pub exchange_info_path: &'static str,
    pub ticker_24hr_path: &'static str,
}

pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

pub const BINANCE_QUOTE_ASSETS: &[&str] = &["USDT", "USDC", "FDUSD", "BTC", "ETH", "BNB"];
pub const BINANCE_DEFAULT_QUOTE: &str = "USDT";
pub const BINANCE_MAX_PAIRS: usize = 50;

pub struct BinanceConfig {
    pub limits: RestLimits,
    pub rest: RestEndpoints,
    pub client: ClientDefaults,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    limits: RestLimits {
        klines_limit: 500,
        session_klines_limit: 1000,
        weight_limit_minute: 6000,
        kline_call_weight: 2,
        ticker_call_weight: 2,
        all_tickers_call_weight: 80,
        exchange_info_call_weight: 20,
        batch_size: 10,
    },
    rest: RestEndpoints {
        base_url: "https://api.binance.com",
        exchange_info_path: "/api/v3/exchangeInfo",
        ticker_24hr_path: "/api/v3/ticker/24hr",
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
    },
};
