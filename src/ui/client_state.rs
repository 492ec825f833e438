use {
    crate::{config::PERSISTENCE, ui::table::TableView},
    anyhow::{Context, Result, bail},
    serde::{Deserialize, Serialize},
    std::{
        collections::BTreeSet,
        fs::{self, File},
        io::{BufReader, BufWriter},
        path::Path,
    },
};

/// Favorites and the last table view, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    pub version: u32,
    pub favorites: BTreeSet<String>,
    #[serde(default)]
    pub view: TableView,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            version: PERSISTENCE.client.version,
            favorites: BTreeSet::new(),
            view: TableView::default(),
        }
    }
}

impl ClientState {
    /// Missing file gives an empty state. Unreadable or incompatible files are logged and
    /// replaced by an empty state as well.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Ignoring client state at {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let state: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if state.version != PERSISTENCE.client.version {
            bail!(
                "State version mismatch: file v{} vs required v{}",
                state.version,
                PERSISTENCE.client.version
            );
        }
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write client state to {}", path.display()))?;
        Ok(())
    }

    /// Returns whether `symbol` is a favorite afterwards.
    pub fn toggle_favorite(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        if self.favorites.remove(&symbol) {
            false
        } else {
            self.favorites.insert(symbol);
            true
        }
    }
}
