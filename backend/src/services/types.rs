//! Service input and output shapes

use serde::{Deserialize, Serialize};

use crate::db::{RecipeId, RecipeRecord};

/// Fields supplied when creating or replacing a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub servings: Option<i32>,
}

impl RecipeInput {
    /// A fresh, unsaved recipe carrying these fields.
    pub fn into_new_recipe(self) -> RecipeRecord {
        let mut recipe = RecipeRecord::default();
        self.apply_to(&mut recipe);
        recipe
    }

    /// Overwrite every mutable field of `recipe`. The id is left untouched.
    pub fn apply_to(self, recipe: &mut RecipeRecord) {
        recipe.title = self.title;
        recipe.description = self.description;
        recipe.ingredients = self.ingredients;
        recipe.instructions = self.instructions;
        recipe.vegetarian = self.vegetarian;
        recipe.servings = self.servings;
    }
}

/// Recipe as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: Option<RecipeId>,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub vegetarian: bool,
    pub servings: Option<i32>,
}

impl From<RecipeRecord> for RecipeResponse {
    fn from(recipe: RecipeRecord) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            vegetarian: recipe.vegetarian,
            servings: recipe.servings,
        }
    }
}
