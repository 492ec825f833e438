pub(crate) mod board;
mod scanner;

pub use {
    board::AnalysisBoard,
    scanner::{ScanSummary, Scanner, ScannerConfig},
};
