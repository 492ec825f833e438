//! Configuration module for the scanner.

// Can all be private now because we have a public re-export.
mod analysis;
mod binance;
mod debug;
mod persistence;

// Public
pub mod constants;

// Re-export commonly used items
pub use analysis::{
    ANALYSIS, AnalysisConfig, EmaPeriods, PatternSettings, SignalSettings, TestedTier,
    TrendSettings, ZoneBand, ZoneSettings,
};
pub use binance::{
    BINANCE, BINANCE_DEFAULT_QUOTE, BINANCE_MAX_PAIRS, BINANCE_QUOTE_ASSETS, BinanceApiConfig,
};
pub use debug::DF;
pub use persistence::PERSISTENCE;
