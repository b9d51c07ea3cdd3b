use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipes::repo::{MealCategory, Recipe};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub category: MealCategory,
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub steps: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinderRequest {
    pub pantry: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipeMatch {
    pub recipe: Recipe,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShoppingListRequest {
    pub recipe_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ShoppingItem {
    pub ingredient: String,
    /// How many of the selected recipes ask for it.
    pub uses: u32,
}
