//! Recipe persistence abstraction
//!
//! The services only talk to a [`RecipeStore`]. Two implementations exist:
//! [`SqliteRecipeRepository`](crate::db::SqliteRecipeRepository), which renders
//! predicates to SQL, and [`InMemoryRecipeStore`], which evaluates them directly.

mod memory;

use async_trait::async_trait;

use crate::db::{RecipeId, RecipeRecord};
use crate::error::StoreResult;
use crate::filters::RecipePredicate;
use crate::pagination::{Page, PageRequest};

pub use memory::InMemoryRecipeStore;

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert a recipe without an id (assigning one) or overwrite the row of a
    /// recipe that has one. Returns the stored recipe.
    async fn save(&self, recipe: RecipeRecord) -> StoreResult<RecipeRecord>;

    /// Save every recipe or none of them. Output order matches input order.
    async fn save_all(&self, recipes: Vec<RecipeRecord>) -> StoreResult<Vec<RecipeRecord>>;

    async fn find_by_id(&self, id: RecipeId) -> StoreResult<Option<RecipeRecord>>;

    async fn exists_by_id(&self, id: RecipeId) -> StoreResult<bool>;

    /// Remove a recipe. Deleting a missing id is not reported.
    async fn delete_by_id(&self, id: RecipeId) -> StoreResult<()>;

    /// One page of the recipes matching `predicate`, plus the total match count.
    async fn find_page(
        &self,
        predicate: &RecipePredicate,
        page: &PageRequest,
    ) -> StoreResult<Page<RecipeRecord>>;

    /// Every recipe matching `predicate`, by ascending id.
    async fn find_all(&self, predicate: &RecipePredicate) -> StoreResult<Vec<RecipeRecord>>;
}
