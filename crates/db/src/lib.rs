pub mod catalog;
pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod production;
pub mod repositories;

pub use catalog::CatalogService;
pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoCatalog, SeedResult, VerificationResult};
pub use production::RepositoryProductionSource;
pub use repositories::{CatalogRepositories, RepositoryError};
