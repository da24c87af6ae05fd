//! In-memory recipe store
//!
//! Keeps recipes in a `BTreeMap` behind a `parking_lot::RwLock` and evaluates
//! predicates with [`RecipePredicate::matches`]. Ordering follows SQLite's
//! rules (binary text comparison, NULL servings first when ascending) so both
//! stores page identically.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::RecipeStore;
use crate::db::{RecipeId, RecipeRecord};
use crate::error::{StoreError, StoreResult};
use crate::filters::RecipePredicate;
use crate::pagination::{Page, PageRequest, Sort, SortDirection, SortField};

#[derive(Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<RecipeId, RecipeRecord>,
}

impl Inner {
    fn next_id(&mut self) -> RecipeId {
        self.last_id += 1;
        RecipeId(self.last_id)
    }

    fn store(&mut self, mut recipe: RecipeRecord) -> RecipeRecord {
        let id = match recipe.id {
            Some(id) => id,
            None => self.next_id(),
        };
        recipe.id = Some(id);
        self.rows.insert(id, recipe.clone());
        recipe
    }
}

#[derive(Default)]
pub struct InMemoryRecipeStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, predicate: &RecipePredicate) -> Vec<RecipeRecord> {
        self.inner
            .read()
            .rows
            .values()
            .filter(|r| predicate.matches(r))
            .cloned()
            .collect()
    }
}

fn compare(sort: Sort, a: &RecipeRecord, b: &RecipeRecord) -> Ordering {
    let primary = match sort.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Servings => a.servings.cmp(&b.servings),
    };
    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn save(&self, recipe: RecipeRecord) -> StoreResult<RecipeRecord> {
        let mut inner = self.inner.write();
        if let Some(id) = recipe.id
            && !inner.rows.contains_key(&id)
        {
            return Err(StoreError::NotPersisted(id));
        }
        Ok(inner.store(recipe))
    }

    async fn save_all(&self, recipes: Vec<RecipeRecord>) -> StoreResult<Vec<RecipeRecord>> {
        let mut inner = self.inner.write();
        if let Some(id) = recipes
            .iter()
            .filter_map(|r| r.id)
            .find(|id| !inner.rows.contains_key(id))
        {
            return Err(StoreError::NotPersisted(id));
        }
        Ok(recipes.into_iter().map(|r| inner.store(r)).collect())
    }

    async fn find_by_id(&self, id: RecipeId) -> StoreResult<Option<RecipeRecord>> {
        Ok(self.inner.read().rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: RecipeId) -> StoreResult<bool> {
        Ok(self.inner.read().rows.contains_key(&id))
    }

    async fn delete_by_id(&self, id: RecipeId) -> StoreResult<()> {
        self.inner.write().rows.remove(&id);
        Ok(())
    }

    async fn find_page(
        &self,
        predicate: &RecipePredicate,
        page: &PageRequest,
    ) -> StoreResult<Page<RecipeRecord>> {
        let mut rows = self.matching(predicate);
        let total = rows.len() as u64;
        rows.sort_by(|a, b| compare(page.sort(), a, b));

        let content = rows
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();
        Ok(Page::new(content, page, total))
    }

    async fn find_all(&self, predicate: &RecipePredicate) -> StoreResult<Vec<RecipeRecord>> {
        Ok(self.matching(predicate))
    }
}
