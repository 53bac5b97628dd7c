pub mod client;
pub mod session;
pub mod table;

pub use client::SwitchClient;
pub use session::{AuthMode, SessionState, SessionStore};
pub use table::{CellMode, Row, Table};
