//! API layer - HTTP endpoints

pub mod authorized_keys;
pub mod health;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
