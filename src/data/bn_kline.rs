use {
    anyhow::{Result, bail},
    binance_sdk::{
        config::ConfigurationRestApi,
        errors::{self, ConnectorError as connection_error},
        spot::{
            SpotRestApi,
            rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
        },
    },
    std::{collections::HashSet, convert::TryFrom, error::Error, fmt},
};

use crate::{
    config::{BINANCE, BinanceApiConfig, DF},
    data::GlobalRateLimiter,
    domain::{Candle, PairInterval, Timeframe},
};

pub fn interval_for(timeframe: Timeframe) -> KlinesIntervalEnum {
    match timeframe {
        Timeframe::M15 => KlinesIntervalEnum::Interval15m,
        Timeframe::H4 => KlinesIntervalEnum::Interval4h,
        Timeframe::D1 => KlinesIntervalEnum::Interval1d,
    }
}

/// Intraday interval that splits one session of `timeframe` into several candles.
pub fn session_interval_for(timeframe: Timeframe) -> KlinesIntervalEnum {
    match timeframe {
        Timeframe::M15 => KlinesIntervalEnum::Interval1m,
        Timeframe::H4 | Timeframe::D1 => KlinesIntervalEnum::Interval15m,
    }
}

/// One raw kline row, numeric strings already parsed.
#[derive(Debug, PartialOrd, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: Option<f64>,
    pub base_asset_volume: Option<f64>,
    pub quote_asset_volume: Option<f64>,
}

#[derive(Debug)]
pub enum BNKlineError {
    InvalidLength,
    InvalidType(String),
    MissingField(&'static str),
    ConnectionFailed(String),
}

impl fmt::Display for BNKlineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            BNKlineError::InvalidLength => write!(f, "Invalid length"),
            BNKlineError::InvalidType(string) => write!(f, "Invalid type: {}", string),
            BNKlineError::MissingField(field) => write!(f, "Missing or unparsable {}", field),
            BNKlineError::ConnectionFailed(msg) => {
                write!(f, "Binance API connection failed: {}.", msg)
            }
        }
    }
}

impl Error for BNKlineError {}

fn parse_numeric_string(item: Option<KlinesItemInner>) -> Option<f64> {
    item.and_then(|inner| {
        if let KlinesItemInner::String(s) = inner {
            s.parse::<f64>().ok()
        } else {
            None
        }
    })
}

impl TryFrom<Vec<KlinesItemInner>> for BNKline {
    type Error = BNKlineError;

    fn try_from(vec_inner_klines: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        if vec_inner_klines.len() < 8 {
            return Err(BNKlineError::InvalidLength);
        }

        let mut items = vec_inner_klines.into_iter();
        let open_timestamp_ms = match items.next().ok_or(BNKlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(BNKlineError::InvalidType("open_time".to_string())),
        };

        let open_price = parse_numeric_string(items.next());
        let high_price = parse_numeric_string(items.next());
        let low_price = parse_numeric_string(items.next());
        let close_price = parse_numeric_string(items.next());
        let base_asset_volume = parse_numeric_string(items.next());
        let _close_time = items.next();
        let quote_asset_volume = parse_numeric_string(items.next());

        Ok(BNKline {
            open_timestamp_ms,
            open_price,
            high_price,
            low_price,
            close_price,
            base_asset_volume,
            quote_asset_volume,
        })
    }
}

impl TryFrom<BNKline> for Candle {
    type Error = BNKlineError;

    fn try_from(bn: BNKline) -> Result<Self, Self::Error> {
        Ok(Candle::new(
            bn.open_timestamp_ms,
            bn.open_price.ok_or(BNKlineError::MissingField("open"))?,
            bn.high_price.ok_or(BNKlineError::MissingField("high"))?,
            bn.low_price.ok_or(BNKlineError::MissingField("low"))?,
            bn.close_price.ok_or(BNKlineError::MissingField("close"))?,
            bn.base_asset_volume.unwrap_or_default(),
        ))
    }
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<BNKline>, BNKlineError> {
    data.into_iter().map(Vec::try_into).collect()
}

pub(crate) fn configure_binance_client() -> Result<RestApi, anyhow::Error> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    Ok(SpotRestApi::production(rest_conf))
}

async fn fetch_binance_klines(
    rest_client: &RestApi,
    params: KlinesParams,
    pair_interval: &PairInterval,
) -> Result<Vec<Vec<KlinesItemInner>>, anyhow::Error> {
    match rest_client.klines(params).await {
        Ok(r) => Ok(r.data().await?),
        Err(e) => {
            if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                match conn_err {
                    connection_error::ConnectorClientError(msg) => {
                        log::error!(
                            "{} Client error: Check your request parameters. {}",
                            pair_interval,
                            msg
                        );
                    }
                    connection_error::TooManyRequestsError(msg) => {
                        log::warn!(
                            "{} Rate limit exceeded. Please wait and try again. {}",
                            pair_interval,
                            msg
                        );
                    }
                    connection_error::RateLimitBanError(msg) => {
                        log::error!(
                            "{} IP address banned due to excessive rate limits. {}",
                            pair_interval,
                            msg
                        );
                    }
                    errors::ConnectorError::ServerError { msg, status_code } => {
                        log::error!(
                            "{} Server error: {} (status code: {:?})",
                            pair_interval,
                            msg,
                            status_code
                        );
                    }
                    errors::ConnectorError::NetworkError(msg) => {
                        log::error!(
                            "{} Network error: Check your internet connection. {}",
                            pair_interval,
                            msg
                        );
                    }
                    connection_error::BadRequestError(msg) => {
                        log::warn!("{} Bad request (unknown symbol?). {}", pair_interval, msg);
                    }
                    other => {
                        log::error!("Unexpected ConnectionError variant: {:?}", other);
                    }
                }
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(conn_err.to_string()))
                        .context(format!("Binance API call failed for {}", pair_interval)),
                )
            } else {
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(e.to_string())).context(
                        format!("Unexpected error during API call for {}", pair_interval),
                    ),
                )
            }
        }
    }
}

/// Fetch the most recent `limit` klines at `interval` for a pair in one call, oldest first.
pub async fn load_klines(
    rest_client: &RestApi,
    pair_interval: &PairInterval,
    interval: KlinesIntervalEnum,
    limit: i32,
    limiter: &GlobalRateLimiter,
) -> Result<Vec<Candle>, anyhow::Error> {
    limiter
        .acquire(BINANCE.limits.kline_call_weight, pair_interval.bn_name())
        .await;

    let params = KlinesParams::builder(pair_interval.bn_name().to_string(), interval)
        .limit(limit)
        .build()?;

    let raw = fetch_binance_klines(rest_client, params, pair_interval).await?;
    let bn_klines = convert_klines(raw).map_err(|e| {
        anyhow::Error::new(e).context(format!("{} convert_klines failed", pair_interval))
    })?;

    if has_duplicate_kline_open_time(&bn_klines) {
        bail!(
            "has_duplicate_kline_open_time() failed for {} so bailing load_klines()!",
            pair_interval
        );
    }

    let mut candles = bn_klines
        .into_iter()
        .map(Candle::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::Error::new(e).context(format!("{} bad kline", pair_interval)))?;
    candles.sort_by_key(|c| c.timestamp_ms);

    if DF.log_fetches {
        log::info!("Fetched {} klines for {}", candles.len(), pair_interval.name);
    }
    Ok(candles)
}

fn has_duplicate_kline_open_time(klines: &[BNKline]) -> bool {
    let mut seen_ids = HashSet::new();
    klines.iter().any(|k| !seen_ids.insert(k.open_timestamp_ms))
}
