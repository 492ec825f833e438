mod client_state;
mod table;

pub use {
    client_state::ClientState,
    table::{
        SignalFilter, SortDirection, SortKey, TableView, render_setups, render_status,
        render_table, select_rows,
    },
};
