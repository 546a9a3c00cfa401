pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod production;

pub use catalog::SortDirection;
pub use domain::product::{NewProduct, Product, ProductId, ProductPatch};
pub use domain::raw_material::{NewRawMaterial, RawMaterial, RawMaterialId, RawMaterialPatch};
pub use domain::recipe::{NewRecipeLine, RecipeLine, RecipeLineId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use production::{
    CommitPolicy, ProductionPlanner, ProductionReport, ProductionService, ProductionSource,
    ProductionSuggestion, VirtualStock,
};
