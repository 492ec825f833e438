//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Activate trace_time macro (for scope-level timing)
    pub log_performance: bool,

    /// Log every symbol fetch and its outcome.
    pub log_fetches: bool,

    /// Log each batch merge into the board.
    pub log_batches: bool,

    /// Log the signals emitted per symbol.
    pub log_signals: bool,

    pub log_rate_limiter: bool,
}

pub const DF: LogFlags = LogFlags {
    log_performance: false,
    log_fetches: false,
    log_batches: true,
    log_signals: true,
    log_rate_limiter: true,
};
