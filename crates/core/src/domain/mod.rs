pub mod product;
pub mod raw_material;
pub mod recipe;
