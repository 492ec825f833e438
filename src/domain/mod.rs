// Domain types and value objects
mod candle;
mod pair_interval;
mod ticker;
mod timeframe;

// Re-export commonly used types to the world
pub use candle::{Candle, VolumeColor, attach_derived_fields};
pub use pair_interval::PairInterval;
pub use ticker::TickerSnapshot;
pub use timeframe::Timeframe;
