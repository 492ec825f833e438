use crate::{
    config::ZoneSettings,
    models::{RsiDirection, RsiRange, ZoneSignal},
    utils::{max_finite, min_finite},
};

/// High/low and direction of the last `lookback` computed RSI values.
pub fn get_recent_rsi_diff(rsi: &[Option<f64>], lookback: usize) -> Option<RsiRange> {
    if lookback == 0 {
        return None;
    }
    let mut recent: Vec<f64> = rsi.iter().rev().flatten().copied().take(lookback).collect();
    recent.reverse();

    let start = *recent.first()?;
    let end = *recent.last()?;
    let high = max_finite(recent.iter().copied())?;
    let low = min_finite(recent.iter().copied())?;

    let direction = if end > start {
        RsiDirection::Pump
    } else if end < start {
        RsiDirection::Dump
    } else {
        RsiDirection::Neutral
    };

    Some(RsiRange {
        high,
        low,
        start,
        end,
        pump_strength: high - low,
        dump_strength: (low - high).abs(),
        direction,
    })
}

/// Map a recent RSI range to a zone label. Bands are checked in priority order MAX, BALANCE,
/// LOWEST; anything else (gap bands, neutral direction, no data) is `NoStrongSignal`.
pub fn classify_zone(range: Option<&RsiRange>, settings: &ZoneSettings) -> ZoneSignal {
    let Some(range) = range else {
        return ZoneSignal::NoStrongSignal;
    };
    let (strength, pump) = match range.direction {
        RsiDirection::Pump => (range.pump_strength, true),
        RsiDirection::Dump => (range.dump_strength, false),
        RsiDirection::Neutral => return ZoneSignal::NoStrongSignal,
    };

    let in_band = |min: f64, max: f64| strength >= min && strength <= max;
    let (pump_label, dump_label) = if strength >= settings.max_zone_min {
        (ZoneSignal::MaxZonePump, ZoneSignal::MaxZoneDump)
    } else if in_band(settings.balance.min, settings.balance.max) {
        (ZoneSignal::BalanceZonePump, ZoneSignal::BalanceZoneDump)
    } else if in_band(settings.lowest.min, settings.lowest.max) {
        (ZoneSignal::LowestZonePump, ZoneSignal::LowestZoneDump)
    } else {
        return ZoneSignal::NoStrongSignal;
    };
    if pump { pump_label } else { dump_label }
}
