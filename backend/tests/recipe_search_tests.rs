//! Search and CRUD behaviour checked against both store implementations
//!
//! Every test runs once on the SQLite repository (private in-memory database)
//! and once on the in-memory store, so the SQL rendering of a predicate and its
//! direct evaluation are held to the same results.

use std::collections::BTreeSet;
use std::sync::Arc;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use recipe_backend::db::{Database, RecipeId};
use recipe_backend::error::{RecipeError, StoreError};
use recipe_backend::filters::{RecipeCriteria, RecipePredicate};
use recipe_backend::pagination::{PageRequest, Sort, SortDirection, SortField};
use recipe_backend::services::{
    RecipeInput, RecipeMutationService, RecipeQueryService, RecipeResponse,
};
use recipe_backend::store::{InMemoryRecipeStore, RecipeStore};

struct Harness {
    name: &'static str,
    store: Arc<dyn RecipeStore>,
    queries: RecipeQueryService,
    mutations: RecipeMutationService,
    // Keeps the SQLite pool (and so the in-memory database) alive.
    _db: Option<Database>,
}

impl Harness {
    fn new(name: &'static str, store: Arc<dyn RecipeStore>, db: Option<Database>) -> Self {
        Self {
            name,
            queries: RecipeQueryService::new(store.clone()),
            mutations: RecipeMutationService::new(store.clone()),
            store,
            _db: db,
        }
    }

    async fn search(&self, criteria: RecipeCriteria) -> Vec<RecipeResponse> {
        self.queries
            .search(&criteria, &PageRequest::new(0, 100))
            .await
            .unwrap()
            .content
    }

    async fn search_ids(&self, criteria: RecipeCriteria) -> BTreeSet<RecipeId> {
        self.search(criteria)
            .await
            .into_iter()
            .filter_map(|r| r.id)
            .collect()
    }

    async fn titles(&self, criteria: RecipeCriteria) -> Vec<String> {
        self.search(criteria)
            .await
            .into_iter()
            .map(|r| r.title)
            .collect()
    }
}

async fn harnesses() -> Vec<Harness> {
    let db = Database::connect_in_memory().await.unwrap();
    db.ensure_schema().await.unwrap();
    let sqlite: Arc<dyn RecipeStore> = Arc::new(db.recipes());

    vec![
        Harness::new("sqlite", sqlite, Some(db)),
        Harness::new("memory", Arc::new(InMemoryRecipeStore::new()), None),
    ]
}

fn recipe(
    title: &str,
    ingredients: &[&str],
    instructions: &str,
    vegetarian: bool,
    servings: Option<i32>,
) -> RecipeInput {
    RecipeInput {
        title: title.to_string(),
        description: format!("{} description", title),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        instructions: instructions.to_string(),
        vegetarian,
        servings,
    }
}

fn tomato_pasta() -> RecipeInput {
    recipe(
        "Tomato Pasta",
        &["Tomato", "Pasta", "Salt"],
        "Boil water and add pasta.",
        true,
        Some(2),
    )
}

fn catalogue() -> Vec<RecipeInput> {
    vec![
        tomato_pasta(),
        recipe(
            "Beef Stew",
            &["Beef", "Tomato", "Carrot", "Salt"],
            "Brown the beef. Simmer for 2 hours.",
            false,
            Some(4),
        ),
        recipe(
            "Fried Rice",
            &["Rice", "Egg", "Soy sauce"],
            "Fry the rice in a hot wok.",
            true,
            Some(2),
        ),
        recipe(
            "Chicken Curry",
            &["Chicken", "Rice", "Curry paste"],
            "BOIL the rice, cook the chicken.",
            false,
            Some(4),
        ),
        recipe(
            "Greek Salad",
            &["Tomato", "Cucumber", "Feta", "Olive"],
            "Chop and toss.",
            true,
            None,
        ),
        recipe(
            "Sale Bread",
            &["Flour", "Water", "Salt"],
            "Knead. Bake at 50% humidity.",
            true,
            Some(8),
        ),
    ]
}

async fn seed(h: &Harness) -> Vec<RecipeResponse> {
    h.mutations.create_many(catalogue()).await.unwrap()
}

#[tokio::test]
async fn test_tomato_pasta_scenario() {
    for h in harnesses().await {
        let created = h.mutations.create(tomato_pasta()).await.unwrap();
        let id = created.id.expect("id assigned");

        let included = h.search(RecipeCriteria::default().including(["Tomato"])).await;
        assert_eq!(included, vec![created.clone()], "{}", h.name);

        let excluded = h.search(RecipeCriteria::default().excluding(["Rice"])).await;
        let excluded_ids: Vec<_> = excluded.iter().map(|r| r.id).collect();
        assert_eq!(excluded_ids, vec![Some(id)], "{}", h.name);

        let boil = h.search(RecipeCriteria::default().instruction("boil")).await;
        assert_eq!(boil.len(), 1, "{}", h.name);

        let page = h
            .queries
            .search(
                &RecipeCriteria::default().vegetarian(false),
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert!(page.is_empty(), "{}", h.name);
        assert_eq!(page.total_elements, 0, "{}", h.name);
    }
}

#[tokio::test]
async fn test_create_many_scenario() {
    for h in harnesses().await {
        let created = h
            .mutations
            .create_many(vec![
                recipe("Recipe 1", &["A"], "Mix.", true, Some(1)),
                recipe("Recipe 2", &["B"], "Stir.", false, Some(2)),
            ])
            .await
            .unwrap();

        assert_eq!(created.len(), 2, "{}", h.name);
        assert_eq!(created[0].title, "Recipe 1");
        assert_eq!(created[1].title, "Recipe 2");
        let (a, b) = (created[0].id, created[1].id);
        assert!(a.is_some() && b.is_some(), "{}", h.name);
        assert_ne!(a, b, "{}", h.name);
    }
}

#[tokio::test]
async fn test_no_criteria_returns_every_recipe() {
    for h in harnesses().await {
        let seeded = seed(&h).await;
        let all = h.search(RecipeCriteria::default()).await;
        assert_eq!(all, seeded, "{}", h.name);

        // Blank and empty criteria are the same as absent ones.
        let blank = RecipeCriteria {
            include_ingredients: Some(vec![]),
            exclude_ingredients: Some(vec![]),
            instruction: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(h.search(blank).await, seeded, "{}", h.name);
    }
}

#[tokio::test]
async fn test_single_criteria_hold_for_every_result() {
    for h in harnesses().await {
        seed(&h).await;

        for v in [true, false] {
            let results = h.search(RecipeCriteria::default().vegetarian(v)).await;
            assert!(!results.is_empty(), "{}", h.name);
            assert!(results.iter().all(|r| r.vegetarian == v), "{}", h.name);
        }

        let results = h.search(RecipeCriteria::default().servings(4)).await;
        assert_eq!(results.len(), 2, "{}", h.name);
        assert!(results.iter().all(|r| r.servings == Some(4)));

        let titles = h
            .titles(RecipeCriteria::default().including(["Tomato", "Salt"]))
            .await;
        assert_eq!(titles, vec!["Tomato Pasta", "Beef Stew"], "{}", h.name);

        let titles = h
            .titles(RecipeCriteria::default().excluding(["Rice", "Salt"]))
            .await;
        assert_eq!(titles, vec!["Greek Salad"], "{}", h.name);

        let results = h.search(RecipeCriteria::default().instruction("RICE")).await;
        assert!(!results.is_empty());
        assert!(
            results
                .iter()
                .all(|r| r.instructions.to_lowercase().contains("rice")),
            "{}",
            h.name
        );
    }
}

#[tokio::test]
async fn test_ingredient_match_is_exact_and_case_sensitive() {
    for h in harnesses().await {
        seed(&h).await;

        let lower = h.search(RecipeCriteria::default().including(["tomato"])).await;
        assert!(lower.is_empty(), "{}", h.name);

        let partial = h.search(RecipeCriteria::default().including(["Soy"])).await;
        assert!(partial.is_empty(), "{}", h.name);

        let exact = h
            .search(RecipeCriteria::default().including(["Soy sauce"]))
            .await;
        assert_eq!(exact.len(), 1, "{}", h.name);
    }
}

#[tokio::test]
async fn test_instruction_wildcards_are_literal() {
    for h in harnesses().await {
        seed(&h).await;

        let titles = h.titles(RecipeCriteria::default().instruction("50%")).await;
        assert_eq!(titles, vec!["Sale Bread"], "{}", h.name);

        let underscore = h.search(RecipeCriteria::default().instruction("b_il")).await;
        assert!(underscore.is_empty(), "{}", h.name);

        let percent = h.search(RecipeCriteria::default().instruction("%")).await;
        assert_eq!(percent.len(), 1, "{}", h.name);
    }
}

#[tokio::test]
async fn test_combined_criteria_intersect_single_results() {
    for h in harnesses().await {
        seed(&h).await;

        let singles = [
            RecipeCriteria::default().vegetarian(true),
            RecipeCriteria::default().servings(2),
            RecipeCriteria::default().including(["Tomato"]),
            RecipeCriteria::default().excluding(["Salt"]),
            RecipeCriteria::default().instruction("the"),
        ];

        let mut single_ids = Vec::new();
        for criteria in &singles {
            single_ids.push(h.search_ids(criteria.clone()).await);
        }

        for i in 0..singles.len() {
            for j in (i + 1)..singles.len() {
                let combined = merge(&singles[i], &singles[j]);
                let expected: BTreeSet<_> = single_ids[i]
                    .intersection(&single_ids[j])
                    .copied()
                    .collect();
                assert_eq!(
                    h.search_ids(combined).await,
                    expected,
                    "{} pair ({}, {})",
                    h.name,
                    i,
                    j
                );
            }
        }

        let all = singles
            .iter()
            .fold(RecipeCriteria::default(), |acc, c| merge(&acc, c));
        let expected = single_ids.iter().skip(1).fold(single_ids[0].clone(), |acc, ids| {
            acc.intersection(ids).copied().collect()
        });
        assert_eq!(h.search_ids(all).await, expected, "{}", h.name);
    }
}

fn merge(a: &RecipeCriteria, b: &RecipeCriteria) -> RecipeCriteria {
    RecipeCriteria {
        vegetarian: a.vegetarian.or(b.vegetarian),
        servings: a.servings.or(b.servings),
        include_ingredients: a
            .include_ingredients
            .clone()
            .or_else(|| b.include_ingredients.clone()),
        exclude_ingredients: a
            .exclude_ingredients
            .clone()
            .or_else(|| b.exclude_ingredients.clone()),
        instruction: a.instruction.clone().or_else(|| b.instruction.clone()),
    }
}

#[tokio::test]
async fn test_find_all_filters_and_orders_by_id() {
    for h in harnesses().await {
        let seeded = seed(&h).await;

        let everything = h
            .store
            .find_all(&RecipePredicate::match_all())
            .await
            .unwrap();
        let ids: Vec<_> = everything.iter().map(|r| r.id).collect();
        let seeded_ids: Vec<_> = seeded.iter().map(|r| r.id).collect();
        assert_eq!(ids, seeded_ids, "{}", h.name);
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{}", h.name);

        let criteria = RecipeCriteria::default()
            .vegetarian(true)
            .including(["Salt"]);
        let found = h
            .store
            .find_all(&RecipePredicate::from_criteria(&criteria))
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Tomato Pasta", "Sale Bread"], "{}", h.name);
        assert!(found[0].id < found[1].id, "{}", h.name);

        let none = h
            .store
            .find_all(&RecipePredicate::from_criteria(
                &RecipeCriteria::default().excluding(["Salt", "Rice", "Feta"]),
            ))
            .await
            .unwrap();
        assert!(none.is_empty(), "{}", h.name);
    }
}

#[tokio::test]
async fn test_paging_and_sorting() {
    for h in harnesses().await {
        seed(&h).await;

        let first = h
            .queries
            .search(&RecipeCriteria::default(), &PageRequest::new(0, 4))
            .await
            .unwrap();
        assert_eq!(first.content.len(), 4, "{}", h.name);
        assert_eq!(first.total_elements, 6);
        assert_eq!(first.total_pages(), 2);
        assert!(first.is_first() && !first.is_last());

        let second = h
            .queries
            .search(&RecipeCriteria::default(), &PageRequest::new(1, 4))
            .await
            .unwrap();
        assert_eq!(second.content.len(), 2, "{}", h.name);
        assert!(second.is_last());

        let beyond = h
            .queries
            .search(&RecipeCriteria::default(), &PageRequest::new(5, 4))
            .await
            .unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total_elements, 6);

        let by_title =
            PageRequest::new(0, 3).with_sort(Sort::new(SortField::Title, SortDirection::Desc));
        let page = h
            .queries
            .search(&RecipeCriteria::default(), &by_title)
            .await
            .unwrap();
        let titles: Vec<_> = page.content.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Tomato Pasta", "Sale Bread", "Greek Salad"],
            "{}",
            h.name
        );

        // Equal servings fall back to id order; missing servings sort first.
        let by_servings =
            PageRequest::new(0, 6).with_sort(Sort::new(SortField::Servings, SortDirection::Asc));
        let page = h
            .queries
            .search(&RecipeCriteria::default(), &by_servings)
            .await
            .unwrap();
        let titles: Vec<_> = page.content.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Greek Salad",
                "Tomato Pasta",
                "Fried Rice",
                "Beef Stew",
                "Chicken Curry",
                "Sale Bread"
            ],
            "{}",
            h.name
        );
    }
}

#[tokio::test]
async fn test_huge_page_request_is_an_empty_page() {
    for h in harnesses().await {
        seed(&h).await;

        let page = h
            .queries
            .search(
                &RecipeCriteria::default(),
                &PageRequest::new(u32::MAX, u32::MAX),
            )
            .await
            .unwrap();
        assert!(page.is_empty(), "{}", h.name);
        assert_eq!(page.total_elements, 6, "{}", h.name);
        assert!(page.is_last(), "{}", h.name);
    }
}

#[tokio::test]
async fn test_get_update_delete_lifecycle() {
    for h in harnesses().await {
        assert_matches!(
            h.queries.get_by_id(RecipeId(1)).await,
            Err(RecipeError::NotFound(_))
        );

        let id = h.mutations.create(tomato_pasta()).await.unwrap().id.unwrap();
        assert_eq!(h.queries.get_by_id(id).await.unwrap().title, "Tomato Pasta");

        let replacement = recipe(
            "Spicy Pasta",
            &["Chili", "Pasta"],
            "Fry the chili.",
            false,
            Some(3),
        );
        let updated = h.mutations.update(id, replacement).await.unwrap();
        assert_eq!(updated.id, Some(id));

        let fetched = h.queries.get_by_id(id).await.unwrap();
        assert_eq!(fetched.title, "Spicy Pasta", "{}", h.name);
        assert_eq!(fetched.ingredients, vec!["Chili", "Pasta"]);
        assert!(!fetched.vegetarian);
        assert_eq!(fetched.servings, Some(3));

        // The old ingredients no longer match.
        let stale = h.search(RecipeCriteria::default().including(["Tomato"])).await;
        assert!(stale.is_empty(), "{}", h.name);

        h.mutations.delete(id).await.unwrap();
        assert_matches!(
            h.queries.get_by_id(id).await,
            Err(RecipeError::NotFound(missing)) if missing == id
        );
        assert_matches!(h.mutations.delete(id).await, Err(RecipeError::NotFound(_)));
        assert_matches!(
            h.mutations.update(id, tomato_pasta()).await,
            Err(RecipeError::NotFound(_))
        );
    }
}

#[tokio::test]
async fn test_batch_is_all_or_nothing() {
    for h in harnesses().await {
        let mut vanished = tomato_pasta().into_new_recipe();
        vanished.id = Some(RecipeId(999));
        let batch = vec![tomato_pasta().into_new_recipe(), vanished];

        assert_matches!(
            h.store.save_all(batch).await,
            Err(StoreError::NotPersisted(RecipeId(999)))
        );
        assert!(h.search(RecipeCriteria::default()).await.is_empty(), "{}", h.name);
    }
}

#[tokio::test]
async fn test_sqlite_reports_corrupt_ingredients() {
    let db = Database::connect_in_memory().await.unwrap();
    db.ensure_schema().await.unwrap();
    sqlx::query("INSERT INTO recipes (title, ingredients) VALUES ('Broken', 'not json')")
        .execute(db.pool())
        .await
        .unwrap();

    let queries = RecipeQueryService::new(Arc::new(db.recipes()));
    assert_matches!(
        queries.get_by_id(RecipeId(1)).await,
        Err(RecipeError::Store(StoreError::CorruptIngredients { .. }))
    );
}

#[tokio::test]
async fn test_sqlite_file_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.db");
    let url = path.to_str().unwrap();

    let id = {
        let db = Database::connect(url, 2).await.unwrap();
        db.ensure_schema().await.unwrap();
        let mutations = RecipeMutationService::new(Arc::new(db.recipes()));
        let id = mutations.create(tomato_pasta()).await.unwrap().id.unwrap();
        db.pool().close().await;
        id
    };

    let db = Database::connect(url, 2).await.unwrap();
    db.ensure_schema().await.unwrap();
    let queries = RecipeQueryService::new(Arc::new(db.recipes()));
    let fetched = queries.get_by_id(id).await.unwrap();
    assert_eq!(fetched.ingredients, vec!["Tomato", "Pasta", "Salt"]);
}
