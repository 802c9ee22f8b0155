pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod seed;

pub use connection::{connect, connect_with_settings, DbPool};
pub use seed::{seed_default_catalog, SeedOutcome, DEFAULT_CATALOG};
