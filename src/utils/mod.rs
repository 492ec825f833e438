mod maths_utils;
mod perf;
mod time_utils;

pub use time_utils::{TimeUtils, epoch_ms_to_utc, format_duration, now_timestamp_ms};

pub(crate) use maths_utils::{
    last_n_present, max_finite, min_finite, pct_distance, pct_gap, value_at,
};
