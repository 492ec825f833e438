use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Direction of a trade setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    /// +1 for long, -1 for short. Multiplies price offsets.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

/// Entry, stop and 1R/2R targets of a qualifying setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
}

impl TradeSetup {
    pub fn risk(&self) -> f64 {
        (self.entry - self.stop_loss).abs()
    }
}

/// Outcome of a composite detector: either nothing qualified or a full setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum SignalSetup {
    #[default]
    NoSignal,
    Signal(TradeSetup),
}

impl SignalSetup {
    pub fn is_signal(&self) -> bool {
        matches!(self, Self::Signal(_))
    }

    pub fn setup(&self) -> Option<&TradeSetup> {
        match self {
            Self::Signal(setup) => Some(setup),
            Self::NoSignal => None,
        }
    }
}

impl fmt::Display for SignalSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSignal => write!(f, "-"),
            Self::Signal(s) => write!(
                f,
                "E {:.6} SL {:.6} TP1 {:.6} TP2 {:.6}",
                s.entry, s.stop_loss, s.tp1, s.tp2
            ),
        }
    }
}
