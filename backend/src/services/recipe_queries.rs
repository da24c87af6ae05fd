//! Read-side recipe operations: filtered search and lookup by id.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::RecipeId;
use crate::error::{RecipeError, RecipeResult};
use crate::filters::{RecipeCriteria, RecipePredicate};
use crate::pagination::{Page, PageRequest};
use crate::services::types::RecipeResponse;
use crate::store::RecipeStore;

#[derive(Clone)]
pub struct RecipeQueryService {
    store: Arc<dyn RecipeStore>,
}

impl RecipeQueryService {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    /// One page of the recipes matching every supplied criterion.
    pub async fn search(
        &self,
        criteria: &RecipeCriteria,
        page: &PageRequest,
    ) -> RecipeResult<Page<RecipeResponse>> {
        let predicate = RecipePredicate::from_criteria(criteria);
        debug!(
            filters = predicate.filters().len(),
            page = page.page(),
            size = page.size(),
            "Searching recipes"
        );

        let results = self.store.find_page(&predicate, page).await?;
        Ok(results.map(RecipeResponse::from))
    }

    pub async fn get_by_id(&self, id: RecipeId) -> RecipeResult<RecipeResponse> {
        match self.store.find_by_id(id).await? {
            Some(recipe) => Ok(recipe.into()),
            None => {
                warn!(id = %id, "Recipe not found");
                Err(RecipeError::NotFound(id))
            }
        }
    }
}
