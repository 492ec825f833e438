use std::time::Duration;

// Top Level Constants
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

pub mod session {
    use crate::utils::TimeUtils;

    /// Exchange reference clock is UTC-8.
    pub const EXCHANGE_UTC_OFFSET_MS: i64 = -8 * TimeUtils::MS_IN_H;
    /// Daily cutover at 08:00 exchange-local time.
    pub const DAILY_CUTOVER_LOCAL_MS: i64 = 8 * TimeUtils::MS_IN_H;
    /// Daily session ends at 07:45 exchange-local the next day (23h45m session).
    pub const DAILY_SESSION_LENGTH_MS: i64 = TimeUtils::MS_IN_D - 15 * TimeUtils::MS_IN_MIN;
}

pub mod table {
    /// Decimal places when printing prices and percentages.
    pub const PRICE_DECIMALS: usize = 6;
    pub const PCT_DECIMALS: usize = 2;
}
