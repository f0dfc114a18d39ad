pub mod completion;
pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod locks;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
