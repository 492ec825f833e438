use {
    anyhow::{Result, bail},
    futures::future::join_all,
    rayon::prelude::*,
    std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    },
};

use crate::{
    analysis::{AnalysisParams, analyze_pair},
    config::{BINANCE, DF},
    data::MarketDataProvider,
    domain::{Candle, TickerSnapshot, Timeframe},
    engine::AnalysisBoard,
    models::PairAnalysis,
    utils::{format_duration, now_timestamp_ms},
};

/// How the scanner picks symbols and paces its batches.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub batch_size: usize,
    pub poll_interval: Duration,
    pub quote: String,
    pub max_pairs: usize,
    /// Fixed symbol list. `None` discovers symbols from the exchange on the first scan.
    pub symbols: Option<Vec<String>>,
}

/// Counts for one pass over every symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub batches: usize,
    pub analysed: usize,
    pub failed: usize,
    pub interrupted: bool,
}

pub struct Scanner {
    provider: Arc<dyn MarketDataProvider>,
    params: AnalysisParams,
    config: ScannerConfig,
    board: AnalysisBoard,
    symbols: Vec<String>,
    clock: fn() -> i64,
}

/// Sleep granularity while waiting for the next poll, so shutdown is noticed promptly.
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

impl Scanner {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        params: AnalysisParams,
        config: ScannerConfig,
    ) -> Self {
        let symbols = config.symbols.clone().unwrap_or_default();
        Self {
            provider,
            board: AnalysisBoard::new(params.timeframe),
            params,
            config,
            symbols,
            clock: now_timestamp_ms,
        }
    }

    /// Replace the wall clock (tests).
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn board(&self) -> &AnalysisBoard {
        &self.board
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Switch timeframe. The board is recreated; the next scan refills it.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        if timeframe != self.params.timeframe {
            log::info!("Timeframe {} -> {}", self.params.timeframe, timeframe);
        }
        self.params.timeframe = timeframe;
        self.board.reset(timeframe);
    }

    async fn ensure_symbols(&mut self) -> Result<()> {
        if !self.symbols.is_empty() {
            return Ok(());
        }
        self.symbols = self
            .provider
            .fetch_symbols(&self.config.quote, self.config.max_pairs)
            .await?;
        if self.symbols.is_empty() {
            bail!("No tradable {} symbols found", self.config.quote);
        }
        Ok(())
    }

    async fn fetch_one(
        provider: &dyn MarketDataProvider,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<(Vec<Candle>, Vec<Candle>, TickerSnapshot)> {
        futures::try_join!(
            provider.fetch_candles(symbol, timeframe, BINANCE.limits.klines_limit),
            provider.fetch_session_candles(symbol, timeframe),
            provider.fetch_ticker(symbol),
        )
    }

    /// One pass over every symbol in batches. Each batch is fetched concurrently, analysed, and
    /// merged into the board only once every fetch in it has resolved. A failed symbol is logged
    /// and skipped. `on_batch` sees the board after every merge.
    pub async fn scan_once<F>(&mut self, shutdown: &AtomicBool, mut on_batch: F) -> Result<ScanSummary>
    where
        F: FnMut(&AnalysisBoard),
    {
        self.ensure_symbols().await?;
        let mut summary = ScanSummary::default();
        let batch_size = self.config.batch_size.max(1);
        let params = self.params;

        for chunk in self.symbols.chunks(batch_size) {
            if shutdown.load(Ordering::SeqCst) {
                summary.interrupted = true;
                break;
            }

            // 1. Fetch the whole batch concurrently
            let provider = self.provider.as_ref();
            let results = join_all(
                chunk
                    .iter()
                    .map(|symbol| Self::fetch_one(provider, symbol, params.timeframe)),
            )
            .await;

            let mut fetched = Vec::with_capacity(chunk.len());
            for (symbol, result) in chunk.iter().zip(results) {
                match result {
                    Ok((candles, session_candles, ticker)) => {
                        fetched.push((symbol, candles, session_candles, ticker))
                    }
                    Err(e) => {
                        log::warn!("Skipping {}: {:#}", symbol, e);
                        summary.failed += 1;
                    }
                }
            }

            // 2. Analyse (pure, independent per symbol)
            let now_ms = (self.clock)();
            let rows: Vec<PairAnalysis> = fetched
                .par_iter()
                .map(|(symbol, candles, session_candles, ticker)| {
                    analyze_pair(symbol, candles, session_candles, ticker, &params, now_ms)
                })
                .collect();

            // 3. Merge the resolved batch
            let merged = self.board.merge_batch(rows, now_ms);
            summary.analysed += merged;
            summary.batches += 1;
            if DF.log_batches {
                log::info!(
                    "Batch {}: merged {} of {} symbols",
                    summary.batches,
                    merged,
                    chunk.len()
                );
            }
            on_batch(&self.board);
        }

        Ok(summary)
    }

    /// Poll until `shutdown` is set. Errors from a whole pass (e.g. symbol discovery) are logged
    /// and retried on the next tick.
    pub async fn run<F>(&mut self, shutdown: Arc<AtomicBool>, mut on_batch: F) -> Result<()>
    where
        F: FnMut(&AnalysisBoard),
    {
        while !shutdown.load(Ordering::SeqCst) {
            match self.scan_once(&shutdown, &mut on_batch).await {
                Ok(summary) => log::info!(
                    "Scan complete: {} analysed, {} failed in {} batches. Next scan in {}",
                    summary.analysed,
                    summary.failed,
                    summary.batches,
                    format_duration(self.config.poll_interval.as_millis() as i64)
                ),
                Err(e) => log::error!("Scan failed: {:#}", e),
            }

            let mut waited = Duration::ZERO;
            while waited < self.config.poll_interval && !shutdown.load(Ordering::SeqCst) {
                tokio::time::sleep(SHUTDOWN_POLL).await;
                waited += SHUTDOWN_POLL;
            }
        }
        log::info!("Scanner stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        anyhow::anyhow,
        async_trait::async_trait,
        std::{collections::HashMap, sync::Mutex},
    };

    struct MockProvider {
        prices: HashMap<String, f64>,
        discovered: Vec<String>,
        candle_calls: Mutex<Vec<String>>,
        session_calls: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(prices: &[(&str, f64)]) -> Self {
            Self {
                prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
                discovered: prices.iter().map(|(s, _)| s.to_string()).collect(),
                candle_calls: Mutex::new(Vec::new()),
                session_calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn fetch_symbols(&self, _quote: &str, max: usize) -> Result<Vec<String>> {
            Ok(self.discovered.iter().take(max).cloned().collect())
        }

        async fn fetch_candles(
            &self,
            symbol: &str,
            _timeframe: Timeframe,
            limit: i32,
        ) -> Result<Vec<Candle>> {
            if let Ok(mut calls) = self.candle_calls.lock() {
                calls.push(symbol.to_string());
            }
            let price = *self
                .prices
                .get(symbol)
                .ok_or_else(|| anyhow!("unknown symbol {}", symbol))?;
            Ok((0..limit as i64)
                .map(|i| {
                    let p = price + (i as f64 * 0.1).sin();
                    Candle::new(i * 900_000, p, p + 0.2, p - 0.2, p + 0.05, 5.0)
                })
                .collect())
        }

        /// 15m candles for the 50 hours before the fixed clock.
        async fn fetch_session_candles(
            &self,
            symbol: &str,
            _timeframe: Timeframe,
        ) -> Result<Vec<Candle>> {
            if let Ok(mut calls) = self.session_calls.lock() {
                calls.push(symbol.to_string());
            }
            let price = *self
                .prices
                .get(symbol)
                .ok_or_else(|| anyhow!("unknown symbol {}", symbol))?;
            Ok((1..=200_i64)
                .rev()
                .map(|back| {
                    let ts = fixed_clock() - back * 900_000;
                    Candle::new(ts, price, price + 0.2, price - 0.2, price, 5.0)
                })
                .collect())
        }

        async fn fetch_ticker(&self, symbol: &str) -> Result<TickerSnapshot> {
            let price = *self
                .prices
                .get(symbol)
                .ok_or_else(|| anyhow!("no ticker for {}", symbol))?;
            Ok(TickerSnapshot::from_last_price(symbol, price, price * 0.9))
        }
    }

    fn config(batch_size: usize, symbols: Option<Vec<&str>>) -> ScannerConfig {
        ScannerConfig {
            batch_size,
            poll_interval: Duration::from_millis(10),
            quote: "USDT".to_string(),
            max_pairs: 10,
            symbols: symbols.map(|v| v.into_iter().map(String::from).collect()),
        }
    }

    fn fixed_clock() -> i64 {
        1_704_067_200_000
    }

    #[tokio::test]
    async fn failed_symbols_are_skipped_without_aborting_the_batch() {
        let provider = Arc::new(MockProvider::new(&[("AAAUSDT", 10.0), ("BBBUSDT", 20.0)]));
        let mut scanner = Scanner::new(
            provider.clone(),
            AnalysisParams::new(Timeframe::M15, 14),
            config(2, Some(vec!["AAAUSDT", "MISSING", "BBBUSDT"])),
        )
        .with_clock(fixed_clock);

        let mut snapshots = Vec::new();
        let shutdown = AtomicBool::new(false);
        let summary = scanner
            .scan_once(&shutdown, |board| snapshots.push(board.len()))
            .await
            .unwrap();

        assert_eq!(summary.batches, 2);
        assert_eq!(summary.analysed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(snapshots, vec![1, 2]);

        let board = scanner.board();
        assert_eq!(board.last_updated_ms(), Some(fixed_clock()));
        let row = board.get("BBBUSDT").unwrap();
        assert_eq!(row.current_price, 20.0);
        assert_eq!(row.candle_count, 500);
        assert!(board.get("MISSING").is_none());
    }

    #[tokio::test]
    async fn discovers_symbols_when_none_are_given() {
        let provider = Arc::new(MockProvider::new(&[("AAAUSDT", 1.0), ("BBBUSDT", 2.0)]));
        let mut scanner = Scanner::new(
            provider,
            AnalysisParams::new(Timeframe::D1, 14),
            config(10, None),
        );
        let summary = scanner
            .scan_once(&AtomicBool::new(false), |_| {})
            .await
            .unwrap();
        assert_eq!(scanner.symbols(), ["AAAUSDT", "BBBUSDT"]);
        assert_eq!(summary.batches, 1);
        assert_eq!(scanner.board().len(), 2);
    }

    #[tokio::test]
    async fn shutdown_stops_before_the_next_batch() {
        let provider = Arc::new(MockProvider::new(&[("AAAUSDT", 1.0)]));
        let mut scanner = Scanner::new(
            provider.clone(),
            AnalysisParams::new(Timeframe::H4, 14),
            config(1, Some(vec!["AAAUSDT"])),
        );
        let shutdown = Arc::new(AtomicBool::new(true));
        let summary = scanner.scan_once(&shutdown, |_| {}).await.unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.batches, 0);
        assert!(provider.candle_calls.lock().unwrap().is_empty());
        assert!(provider.session_calls.lock().unwrap().is_empty());

        // `run` returns immediately once the flag is set.
        scanner.run(shutdown, |_| {}).await.unwrap();
        assert!(scanner.board().is_empty());
    }

    #[tokio::test]
    async fn timeframe_switch_recreates_the_board() {
        let provider = Arc::new(MockProvider::new(&[("AAAUSDT", 1.0)]));
        let mut scanner = Scanner::new(
            provider,
            AnalysisParams::new(Timeframe::H4, 14),
            config(5, Some(vec!["AAAUSDT"])),
        );
        scanner.scan_once(&AtomicBool::new(false), |_| {}).await.unwrap();
        assert_eq!(scanner.board().len(), 1);

        scanner.set_timeframe(Timeframe::D1);
        assert!(scanner.board().is_empty());
        assert_eq!(scanner.board().timeframe(), Timeframe::D1);
        assert_eq!(scanner.params().timeframe, Timeframe::D1);

        scanner.scan_once(&AtomicBool::new(false), |_| {}).await.unwrap();
        assert_eq!(scanner.board().get("AAAUSDT").unwrap().timeframe, Timeframe::D1);
    }

    #[tokio::test]
    async fn session_extremes_come_from_the_intraday_series() {
        // Scanned candles sit at the epoch, far from the clock, so only the session series can
        // populate today's range.
        let provider = Arc::new(MockProvider::new(&[("AAAUSDT", 10.0)]));
        let mut scanner = Scanner::new(
            provider.clone(),
            AnalysisParams::new(Timeframe::D1, 14),
            config(1, Some(vec!["AAAUSDT"])),
        )
        .with_clock(fixed_clock);
        scanner.scan_once(&AtomicBool::new(false), |_| {}).await.unwrap();

        assert_eq!(*provider.session_calls.lock().unwrap(), ["AAAUSDT"]);
        let row = scanner.board().get("AAAUSDT").unwrap();
        assert_eq!(row.extremes.today_high, Some(10.0 + 0.2));
        assert_eq!(row.extremes.prev_low, Some(10.0 - 0.2));
        assert_eq!(row.candle_count, 500);
    }
}
