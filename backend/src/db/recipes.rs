//! Recipe database repository

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool};

use crate::db::query::{ColumnDef, DatabaseEntity, EntityQuery, SqlValue};
use crate::db::sqlite_helpers::{bool_to_int, int_to_bool, json_to_vec, vec_to_json};
use crate::error::{StoreError, StoreResult};
use crate::filters::RecipePredicate;
use crate::pagination::{Page, PageRequest};
use crate::store::RecipeStore;

/// Store-assigned recipe identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recipe. `id` is `None` until the recipe has been saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeRecord {
    pub id: Option<RecipeId>,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub vegetarian: bool,
    pub servings: Option<i32>,
}

/// Raw `recipes` row as SQLite returns it.
#[derive(Debug, sqlx::FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ingredients: Option<String>,
    pub instructions: String,
    pub vegetarian: i32,
    pub servings: Option<i32>,
}

impl RecipeRow {
    pub fn into_record(self) -> StoreResult<RecipeRecord> {
        let id = RecipeId(self.id);
        let ingredients = json_to_vec(self.ingredients.as_deref())
            .map_err(|source| StoreError::CorruptIngredients { id, source })?;

        Ok(RecipeRecord {
            id: Some(id),
            title: self.title,
            description: self.description,
            ingredients,
            instructions: self.instructions,
            vegetarian: int_to_bool(self.vegetarian),
            servings: self.servings,
        })
    }
}

const RECIPE_COLUMNS: &[ColumnDef] = &[
    ColumnDef {
        name: "id",
        sql_type: "INTEGER",
        nullable: false,
        is_primary_key: true,
        default: None,
    },
    ColumnDef {
        name: "title",
        sql_type: "TEXT",
        nullable: false,
        is_primary_key: false,
        default: None,
    },
    ColumnDef {
        name: "description",
        sql_type: "TEXT",
        nullable: false,
        is_primary_key: false,
        default: Some("''"),
    },
    ColumnDef {
        name: "ingredients",
        sql_type: "TEXT",
        nullable: false,
        is_primary_key: false,
        default: Some("'[]'"),
    },
    ColumnDef {
        name: "instructions",
        sql_type: "TEXT",
        nullable: false,
        is_primary_key: false,
        default: Some("''"),
    },
    ColumnDef {
        name: "vegetarian",
        sql_type: "INTEGER",
        nullable: false,
        is_primary_key: false,
        default: Some("0"),
    },
    ColumnDef {
        name: "servings",
        sql_type: "INTEGER",
        nullable: true,
        is_primary_key: false,
        default: None,
    },
];

impl DatabaseEntity for RecipeRow {
    const TABLE_NAME: &'static str = "recipes";
    const PRIMARY_KEY: &'static str = "id";

    fn columns() -> &'static [ColumnDef] {
        RECIPE_COLUMNS
    }
}

fn into_records(rows: Vec<RecipeRow>) -> StoreResult<Vec<RecipeRecord>> {
    rows.into_iter().map(RecipeRow::into_record).collect()
}

/// Insert or overwrite one recipe on any executor (pool or open transaction).
async fn write_recipe<'c, X>(executor: X, mut recipe: RecipeRecord) -> StoreResult<RecipeRecord>
where
    X: sqlx::Executor<'c, Database = Sqlite>,
{
    let ingredients = vec_to_json(&recipe.ingredients);

    match recipe.id {
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO recipes
                    (title, description, ingredients, instructions, vegetarian, servings)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&recipe.title)
            .bind(&recipe.description)
            .bind(&ingredients)
            .bind(&recipe.instructions)
            .bind(bool_to_int(recipe.vegetarian))
            .bind(recipe.servings)
            .execute(executor)
            .await?;

            recipe.id = Some(RecipeId(result.last_insert_rowid()));
        }
        Some(id) => {
            let result = sqlx::query(
                r#"
                UPDATE recipes
                SET title = ?1, description = ?2, ingredients = ?3, instructions = ?4,
                    vegetarian = ?5, servings = ?6
                WHERE id = ?7
                "#,
            )
            .bind(&recipe.title)
            .bind(&recipe.description)
            .bind(&ingredients)
            .bind(&recipe.instructions)
            .bind(bool_to_int(recipe.vegetarian))
            .bind(recipe.servings)
            .bind(id.0)
            .execute(executor)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotPersisted(id));
            }
        }
    }

    Ok(recipe)
}

/// SQLite-backed [`RecipeStore`].
#[derive(Clone)]
pub struct SqliteRecipeRepository {
    pool: SqlitePool,
}

impl SqliteRecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for SqliteRecipeRepository {
    async fn save(&self, recipe: RecipeRecord) -> StoreResult<RecipeRecord> {
        let saved = write_recipe(&self.pool, recipe).await?;
        tracing::debug!(id = ?saved.id, "Saved recipe row");
        Ok(saved)
    }

    async fn save_all(&self, recipes: Vec<RecipeRecord>) -> StoreResult<Vec<RecipeRecord>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            // An early return drops `tx`, which rolls the batch back.
            saved.push(write_recipe(&mut *tx, recipe).await?);
        }
        tx.commit().await?;

        tracing::debug!(count = saved.len(), "Saved recipe batch");
        Ok(saved)
    }

    async fn find_by_id(&self, id: RecipeId) -> StoreResult<Option<RecipeRecord>> {
        EntityQuery::<RecipeRow>::new()
            .where_clause("id = ?", SqlValue::Int(id.0))
            .fetch_optional(&self.pool)
            .await?
            .map(RecipeRow::into_record)
            .transpose()
    }

    async fn exists_by_id(&self, id: RecipeId) -> StoreResult<bool> {
        let exists: i32 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(int_to_bool(exists))
    }

    async fn delete_by_id(&self, id: RecipeId) -> StoreResult<()> {
        sqlx::query("DELETE FROM recipes WHERE id = ?1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_page(
        &self,
        predicate: &RecipePredicate,
        page: &PageRequest,
    ) -> StoreResult<Page<RecipeRecord>> {
        let query = EntityQuery::<RecipeRow>::new().filter(predicate).paginate(page);
        let total = query.count(&self.pool).await?;
        let rows = query.fetch_all(&self.pool).await?;

        Ok(Page::new(into_records(rows)?, page, total.max(0) as u64))
    }

    async fn find_all(&self, predicate: &RecipePredicate) -> StoreResult<Vec<RecipeRecord>> {
        let rows = EntityQuery::<RecipeRow>::new()
            .filter(predicate)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }
}
