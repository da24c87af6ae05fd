//! Recipe search filters
//!
//! A search names up to five optional criteria. [`RecipePredicate::from_criteria`]
//! turns the ones that are actually supplied into a conjunction of
//! [`RecipeFilter`]s, starting from the empty "match all" predicate:
//!
//! | Criterion             | Supplied when        | Condition                               |
//! |-----------------------|----------------------|-----------------------------------------|
//! | `vegetarian`          | `Some`               | flag equals the value                   |
//! | `servings`            | `Some`               | servings equals the value               |
//! | `include_ingredients` | `Some` and non-empty | every token is an ingredient            |
//! | `exclude_ingredients` | `Some` and non-empty | no token is an ingredient               |
//! | `instruction`         | `Some` and non-blank | contains the text, ignoring ASCII case  |
//!
//! A predicate can be evaluated in memory with [`RecipePredicate::matches`] or
//! rendered to SQL through [`DatabaseFilter`]. Both interpretations agree.

use crate::db::RecipeRecord;
use crate::db::query::{DatabaseFilter, SqlValue};
use crate::db::sqlite_helpers::escape_like;

/// Optional search criteria. `None`, an empty list or a blank string all mean
/// "do not filter on this".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeCriteria {
    pub vegetarian: Option<bool>,
    pub servings: Option<i32>,
    pub include_ingredients: Option<Vec<String>>,
    pub exclude_ingredients: Option<Vec<String>>,
    pub instruction: Option<String>,
}

impl RecipeCriteria {
    pub fn vegetarian(mut self, vegetarian: bool) -> Self {
        self.vegetarian = Some(vegetarian);
        self
    }

    pub fn servings(mut self, servings: i32) -> Self {
        self.servings = Some(servings);
        self
    }

    pub fn including<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_ingredients = Some(ingredients.into_iter().map(Into::into).collect());
        self
    }

    pub fn excluding<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_ingredients = Some(ingredients.into_iter().map(Into::into).collect());
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.instruction = Some(text.into());
        self
    }
}

/// One active search condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeFilter {
    Vegetarian(bool),
    Servings(i32),
    /// Every listed token must be an ingredient
    IncludesAll(Vec<String>),
    /// None of the listed tokens may be an ingredient
    ExcludesAll(Vec<String>),
    /// Case-folded substring of the instructions
    InstructionContains(String),
}

const HAS_INGREDIENT_SQL: &str =
    "EXISTS (SELECT 1 FROM json_each(recipes.ingredients) WHERE json_each.value = ?)";
const LACKS_INGREDIENT_SQL: &str =
    "NOT EXISTS (SELECT 1 FROM json_each(recipes.ingredients) WHERE json_each.value = ?)";

impl RecipeFilter {
    /// Evaluate this condition against a recipe.
    pub fn matches(&self, recipe: &RecipeRecord) -> bool {
        match self {
            RecipeFilter::Vegetarian(v) => recipe.vegetarian == *v,
            RecipeFilter::Servings(n) => recipe.servings == Some(*n),
            RecipeFilter::IncludesAll(tokens) => {
                tokens.iter().all(|t| recipe.ingredients.contains(t))
            }
            RecipeFilter::ExcludesAll(tokens) => {
                !tokens.iter().any(|t| recipe.ingredients.contains(t))
            }
            RecipeFilter::InstructionContains(keyword) => recipe
                .instructions
                .to_ascii_lowercase()
                .contains(&keyword.to_ascii_lowercase()),
        }
    }

    fn push_sql(&self, conditions: &mut Vec<String>, values: &mut Vec<SqlValue>) {
        match self {
            RecipeFilter::Vegetarian(v) => {
                conditions.push("vegetarian = ?".to_string());
                values.push(SqlValue::Bool(*v));
            }
            RecipeFilter::Servings(n) => {
                conditions.push("servings = ?".to_string());
                values.push(SqlValue::Int(i64::from(*n)));
            }
            RecipeFilter::IncludesAll(tokens) => {
                for token in tokens {
                    conditions.push(HAS_INGREDIENT_SQL.to_string());
                    values.push(SqlValue::Text(token.clone()));
                }
            }
            RecipeFilter::ExcludesAll(tokens) => {
                for token in tokens {
                    conditions.push(LACKS_INGREDIENT_SQL.to_string());
                    values.push(SqlValue::Text(token.clone()));
                }
            }
            RecipeFilter::InstructionContains(keyword) => {
                conditions.push("LOWER(instructions) LIKE ? ESCAPE '\\'".to_string());
                values.push(SqlValue::Text(format!(
                    "%{}%",
                    escape_like(&keyword.to_ascii_lowercase())
                )));
            }
        }
    }
}

/// Conjunction of [`RecipeFilter`]s. The empty predicate matches every recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePredicate {
    filters: Vec<RecipeFilter>,
}

impl RecipePredicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    /// AND another condition onto this predicate.
    pub fn and(mut self, filter: RecipeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Build the predicate for a set of criteria, in the fixed order
    /// vegetarian, servings, include, exclude, instruction.
    pub fn from_criteria(criteria: &RecipeCriteria) -> Self {
        [
            criteria.vegetarian.map(RecipeFilter::Vegetarian),
            criteria.servings.map(RecipeFilter::Servings),
            non_empty(&criteria.include_ingredients).map(RecipeFilter::IncludesAll),
            non_empty(&criteria.exclude_ingredients).map(RecipeFilter::ExcludesAll),
            non_blank(&criteria.instruction).map(RecipeFilter::InstructionContains),
        ]
        .into_iter()
        .flatten()
        .fold(Self::match_all(), Self::and)
    }

    pub fn filters(&self) -> &[RecipeFilter] {
        &self.filters
    }

    pub fn matches(&self, recipe: &RecipeRecord) -> bool {
        self.filters.iter().all(|f| f.matches(recipe))
    }
}

impl DatabaseFilter for RecipePredicate {
    fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        for filter in &self.filters {
            filter.push_sql(&mut conditions, &mut values);
        }
        (conditions, values)
    }

    fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

fn non_empty(list: &Option<Vec<String>>) -> Option<Vec<String>> {
    list.as_ref().filter(|l| !l.is_empty()).cloned()
}

fn non_blank(text: &Option<String>) -> Option<String> {
    text.as_ref().filter(|t| !t.trim().is_empty()).cloned()
}
