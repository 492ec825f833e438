#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types outside of crate
pub use analysis::{AnalysisParams, analyze_pair};
pub use config::{BINANCE_DEFAULT_QUOTE, BINANCE_MAX_PAIRS, PERSISTENCE};
pub use domain::{Candle, PairInterval, TickerSnapshot, Timeframe};
pub use engine::{AnalysisBoard, Scanner, ScannerConfig};
pub use models::PairAnalysis;

// CLI argument parsing
use {
    crate::ui::{SignalFilter, SortKey, TableView},
    clap::Parser,
    std::{path::PathBuf, time::Duration},
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Candle timeframe: 15m, 4h or 1d
    #[arg(long, default_value_t = Timeframe::D1)]
    pub timeframe: Timeframe,

    /// RSI lookback period
    #[arg(long)]
    pub rsi_period: usize,

    /// Comma-separated symbols to scan instead of discovering them
    #[arg(long, value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// Quote asset used for symbol discovery
    #[arg(long, default_value = BINANCE_DEFAULT_QUOTE)]
    pub quote: String,

    /// Maximum number of discovered symbols
    #[arg(long, default_value_t = BINANCE_MAX_PAIRS)]
    pub max_pairs: usize,

    /// Symbols fetched concurrently per batch
    #[arg(long, default_value_t = config::BINANCE.limits.batch_size)]
    pub batch_size: usize,

    /// Seconds between polls
    #[arg(long, default_value_t = config::constants::DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_secs: u64,

    /// Scan once, print the table and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Only show symbols containing this text
    #[arg(long)]
    pub search: Option<String>,

    /// Only show favorite symbols
    #[arg(long, default_value_t = false)]
    pub favorites_only: bool,

    /// Row filter: all, any-signal, reversal, spike-or-collapse, breakout, zone
    #[arg(long)]
    pub filter: Option<SignalFilter>,

    /// Sort column: symbol, price, change, rsi, zone, ema70-gap
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Flip the saved sort direction
    #[arg(long, default_value_t = false)]
    pub reverse: bool,

    /// Toggle a symbol in the favorites list before scanning
    #[arg(long)]
    pub favorite: Option<String>,

    /// Client state file (favorites and last view)
    #[arg(long, default_value = PERSISTENCE.client.state_path)]
    pub state_path: PathBuf,
}

impl Cli {
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams::new(self.timeframe, self.rsi_period)
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            batch_size: self.batch_size,
            poll_interval: Duration::from_secs(self.poll_secs),
            quote: self.quote.to_uppercase(),
            max_pairs: self.max_pairs,
            symbols: self.symbols.as_ref().map(|list| {
                list.iter()
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        }
    }

    /// Options given on the command line override the persisted view.
    pub fn apply_to_view(&self, view: &mut TableView) {
        if let Some(search) = &self.search {
            view.search = search.clone();
        }
        if self.favorites_only {
            view.favorites_only = true;
        }
        if let Some(filter) = self.filter {
            view.filter = filter;
        }
        if let Some(sort) = self.sort {
            view.sort = sort;
        }
        if self.reverse {
            view.direction = view.direction.toggle();
        }
    }
}
