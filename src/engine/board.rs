use {
    crate::{domain::Timeframe, models::PairAnalysis},
    std::collections::HashMap,
};

/// Latest analysis per symbol for one timeframe. Each merge replaces a symbol's previous row; no
/// history is kept.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBoard {
    timeframe: Timeframe,
    rows: HashMap<String, PairAnalysis>,
    last_updated_ms: Option<i64>,
}

impl AnalysisBoard {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            ..Default::default()
        }
    }

    /// Merge one fully resolved batch. Rows computed for another timeframe are dropped.
    pub fn merge_batch(&mut self, batch: Vec<PairAnalysis>, now_ms: i64) -> usize {
        let mut merged = 0;
        for row in batch {
            if row.timeframe != self.timeframe {
                log::warn!(
                    "Dropping stale {} row for {} (board is {})",
                    row.timeframe,
                    row.symbol,
                    self.timeframe
                );
                continue;
            }
            self.rows.insert(row.symbol.clone(), row);
            merged += 1;
        }
        if merged > 0 {
            self.last_updated_ms = Some(now_ms);
        }
        merged
    }

    /// Recreate the board wholesale for a new timeframe.
    pub fn reset(&mut self, timeframe: Timeframe) {
        *self = Self::new(timeframe);
    }

    pub fn get(&self, symbol: &str) -> Option<&PairAnalysis> {
        self.rows.get(symbol)
    }

    pub fn rows(&self) -> impl Iterator<Item = &PairAnalysis> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn last_updated_ms(&self) -> Option<i64> {
        self.last_updated_ms
    }
}
