//! Recipe services over a [`RecipeStore`](crate::store::RecipeStore)

pub mod recipe_mutations;
pub mod recipe_queries;
pub mod types;

pub use recipe_mutations::RecipeMutationService;
pub use recipe_queries::RecipeQueryService;
pub use types::{RecipeInput, RecipeResponse};
