//! File persistence configuration

/// Configuration for client (favorites / filters) state persistence
pub struct ClientStatePersistenceConfig {
    /// Default path for saving/loading the client state
    pub state_path: &'static str,
    /// Current version of the state file format
    pub version: u32,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub client: ClientStatePersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    client: ClientStatePersistenceConfig {
        state_path: ".pump_sniper_state.json",
        version: 1,
    },
};
