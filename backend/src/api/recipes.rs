//! Recipe REST endpoints
//!
//! `/api/recipes` lists and searches, `/api/recipes/bulk` creates a batch and
//! `/api/recipes/{id}` reads, replaces or deletes one recipe.

use axum::{
    Json, Router,
    extract::{
        Path, RawQuery, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::config::Config;
use crate::db::RecipeId;
use crate::filters::RecipeCriteria;
use crate::pagination::{Page, PageRequest, Sort};
use crate::services::{RecipeInput, RecipeResponse};

/// Search parameters decoded from the query string.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub criteria: RecipeCriteria,
    pub page: PageRequest,
}

impl SearchParams {
    /// Decode a raw query string. Ingredient lists accept repeated keys,
    /// comma-separated values, or both. For other keys the last value wins;
    /// empty values count as absent and unknown keys are ignored.
    pub fn parse(query: Option<&str>, config: &Config) -> ApiResult<Self> {
        let mut criteria = RecipeCriteria::default();
        let mut page = 0u32;
        let mut size: Option<u32> = None;
        let mut sort = Sort::by_id();
        let mut errors = Vec::new();

        let pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes());
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "vegetarian" => match parse_bool(&value) {
                    Some(v) => criteria.vegetarian = Some(v),
                    None => errors.push(format!(
                        "vegetarian must be true or false, got '{}'",
                        value
                    )),
                },
                "servings" => match value.trim().parse::<i32>() {
                    Ok(v) => criteria.servings = Some(v),
                    Err(_) => {
                        errors.push(format!("servings must be an integer, got '{}'", value))
                    }
                },
                "includeIngredients" => criteria
                    .include_ingredients
                    .get_or_insert_with(Vec::new)
                    .extend(split_list(&value)),
                "excludeIngredients" => criteria
                    .exclude_ingredients
                    .get_or_insert_with(Vec::new)
                    .extend(split_list(&value)),
                "instruction" => criteria.instruction = Some(value.into_owned()),
                "page" => match value.trim().parse::<u32>() {
                    Ok(v) => page = v,
                    Err(_) => errors.push(format!(
                        "page must be a non-negative integer, got '{}'",
                        value
                    )),
                },
                "size" => match value.trim().parse::<u32>() {
                    Ok(v) => size = Some(v),
                    Err(_) => errors.push(format!(
                        "size must be a non-negative integer, got '{}'",
                        value
                    )),
                },
                "sort" => match Sort::parse(value.trim()) {
                    Some(s) => sort = s,
                    None => errors.push(format!(
                        "sort must be id, title or servings, optionally with ,asc or ,desc; \
                         got '{}'",
                        value
                    )),
                },
                _ => {}
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::InvalidInput(errors));
        }

        let size = match size {
            None | Some(0) => config.default_page_size,
            Some(requested) => requested.min(config.max_page_size),
        };

        Ok(Self {
            criteria,
            page: PageRequest::new(page, size).with_sort(sort),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

/// Every constraint `input` breaks, each prefixed with `prefix`.
fn violations(input: &RecipeInput, prefix: &str) -> Vec<String> {
    let mut errors = Vec::new();
    for (field, value) in [
        ("title", &input.title),
        ("description", &input.description),
        ("instructions", &input.instructions),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{}{} must not be blank", prefix, field));
        }
    }
    if input.ingredients.is_empty() {
        errors.push(format!("{}ingredients must not be empty", prefix));
    }
    if let Some(servings) = input.servings
        && servings < 1
    {
        errors.push(format!("{}servings must be at least 1", prefix));
    }
    errors
}

fn validate(input: &RecipeInput) -> ApiResult<()> {
    let errors = violations(input, "");
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(errors))
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid(rejection.body_text()))
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<RecipeId> {
    path.map(|Path(id)| RecipeId(id))
        .map_err(|rejection| ApiError::invalid(rejection.body_text()))
}

/// Search recipes
async fn list_recipes(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<Page<RecipeResponse>>> {
    let params = SearchParams::parse(query.as_deref(), &state.config)?;
    let page = state.queries.search(&params.criteria, &params.page).await?;
    Ok(Json(page))
}

/// Get a recipe by ID
async fn get_recipe(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<RecipeResponse>> {
    let id = path_id(path)?;
    Ok(Json(state.queries.get_by_id(id).await?))
}

/// Create a recipe
async fn create_recipe(
    State(state): State<AppState>,
    body: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<Response> {
    let input = json_body(body)?;
    validate(&input)?;

    let created = state.mutations.create(input).await?;
    let location = created
        .id
        .and_then(|id| HeaderValue::from_str(&format!("/api/recipes/{}", id)).ok());

    let mut response = (StatusCode::CREATED, Json(created)).into_response();
    if let Some(location) = location {
        response.headers_mut().insert(LOCATION, location);
    }
    Ok(response)
}

/// Create several recipes in one batch
async fn create_recipes(
    State(state): State<AppState>,
    body: Result<Json<Vec<RecipeInput>>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<RecipeResponse>>)> {
    let inputs = json_body(body)?;
    let errors: Vec<String> = inputs
        .iter()
        .enumerate()
        .flat_map(|(i, input)| violations(input, &format!("[{}].", i)))
        .collect();
    if !errors.is_empty() {
        return Err(ApiError::InvalidInput(errors));
    }

    let created = state.mutations.create_many(inputs).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a recipe
async fn update_recipe(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<Json<RecipeResponse>> {
    let id = path_id(path)?;
    let input = json_body(body)?;
    validate(&input)?;
    Ok(Json(state.mutations.update(id, input).await?))
}

/// Delete a recipe
async fn delete_recipe(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = path_id(path)?;
    state.mutations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/bulk", post(create_recipes))
        .route(
            "/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}
