//! Write-side recipe operations: create, bulk create, update, delete.
//!
//! Store failures are returned unchanged. `delete` asks the store whether the
//! id exists before removing it, so a missing recipe is reported as
//! [`RecipeError::NotFound`] and the removal is never attempted.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::RecipeId;
use crate::error::{RecipeError, RecipeResult};
use crate::services::types::{RecipeInput, RecipeResponse};
use crate::store::RecipeStore;

#[derive(Clone)]
pub struct RecipeMutationService {
    store: Arc<dyn RecipeStore>,
}

impl RecipeMutationService {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: RecipeInput) -> RecipeResult<RecipeResponse> {
        let saved = self.store.save(input.into_new_recipe()).await?;
        info!(id = ?saved.id, title = %saved.title, "Recipe created");
        Ok(saved.into())
    }

    /// Create every recipe in one batch; results keep the input order.
    pub async fn create_many(&self, inputs: Vec<RecipeInput>) -> RecipeResult<Vec<RecipeResponse>> {
        let recipes = inputs.into_iter().map(RecipeInput::into_new_recipe).collect();
        let saved = self.store.save_all(recipes).await?;
        info!(count = saved.len(), "Recipes created");
        Ok(saved.into_iter().map(RecipeResponse::from).collect())
    }

    /// Replace every mutable field of an existing recipe.
    pub async fn update(&self, id: RecipeId, input: RecipeInput) -> RecipeResult<RecipeResponse> {
        let Some(mut recipe) = self.store.find_by_id(id).await? else {
            warn!(id = %id, "Update of missing recipe");
            return Err(RecipeError::NotFound(id));
        };

        input.apply_to(&mut recipe);
        let saved = self.store.save(recipe).await?;
        info!(id = %id, "Recipe updated");
        Ok(saved.into())
    }

    pub async fn delete(&self, id: RecipeId) -> RecipeResult<()> {
        if !self.store.exists_by_id(id).await? {
            warn!(id = %id, "Delete of missing recipe");
            return Err(RecipeError::NotFound(id));
        }

        self.store.delete_by_id(id).await?;
        info!(id = %id, "Recipe deleted");
        Ok(())
    }
}
