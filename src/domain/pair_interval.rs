use {
    crate::{config::BINANCE_QUOTE_ASSETS, domain::Timeframe},
    serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub timeframe: Timeframe,
}

impl PairInterval {
    pub fn new(name: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            name: name.into(),
            timeframe,
        }
    }

    pub fn get_base(text: &str) -> Option<&str> {
        let quote = Self::get_quote(text)?;
        text.strip_suffix(quote)
    }

    pub fn get_quote(text: &str) -> Option<&str> {
        BINANCE_QUOTE_ASSETS
            .iter()
            .find(|&&ext| text.ends_with(ext))
            .copied()
    }

    // The name we pass into the Binance API (not necessarily display name)
    pub(crate) fn bn_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let base = Self::get_base(&self.name).unwrap_or("UNKNOWN_BASE");
        let quote = Self::get_quote(&self.name).unwrap_or("UNKNOWN_QUOTE");
        write!(
            f,
            "Base: {}, Quote: {}, full: {}, Interval: {}",
            base, quote, self.name, self.timeframe
        )
    }
}
