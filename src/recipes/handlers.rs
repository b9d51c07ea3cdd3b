use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::dto::{
    CreateRecipeRequest, FinderRequest, Pagination, RecipeMatch, ShoppingItem,
    ShoppingListRequest,
};
use super::repo::{self, Recipe};
use super::services::{build_shopping_list, match_by_pantry};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe))
        .route("/recipes/finder", post(find_by_pantry))
        .route("/recipes/shopping-list", post(shopping_list))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Recipe>>, (StatusCode, String)> {
    let recipes = repo::list_page(&state.db, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Recipe>, (StatusCode, String)> {
    match repo::get_by_id(&state.db, id).await {
        Ok(Some(recipe)) => Ok(Json(recipe)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Recipe not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get_recipe failed");
            Err(internal(e))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Recipe>), (StatusCode, String)> {
    let name = payload.name.trim();
    if name.is_empty() {
        warn!("create_recipe with empty name");
        return Err((StatusCode::BAD_REQUEST, "Name is required".into()));
    }

    let recipe = repo::insert(
        &state.db,
        name,
        payload.category,
        payload.image.as_deref(),
        &payload.ingredients,
        payload.steps.as_deref(),
    )
    .await
    .map_err(internal)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/recipes/{}", recipe.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(recipe)))
}

#[instrument(skip(state, payload))]
pub async fn find_by_pantry(
    State(state): State<AppState>,
    Json(payload): Json<FinderRequest>,
) -> Result<Json<Vec<RecipeMatch>>, (StatusCode, String)> {
    if payload.pantry.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "pantry is required".into()));
    }
    let catalog = repo::list_all(&state.db).await.map_err(internal)?;
    Ok(Json(match_by_pantry(&catalog, &payload.pantry)))
}

#[instrument(skip(state, payload))]
pub async fn shopping_list(
    State(state): State<AppState>,
    Json(payload): Json<ShoppingListRequest>,
) -> Result<Json<Vec<ShoppingItem>>, (StatusCode, String)> {
    if payload.recipe_ids.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "recipe_ids is required".into()));
    }
    let recipes = repo::list_by_ids(&state.db, &payload.recipe_ids)
        .await
        .map_err(internal)?;
    if recipes.len() < payload.recipe_ids.len() {
        warn!(
            requested = payload.recipe_ids.len(),
            found = recipes.len(),
            "shopping_list skipped unknown recipe ids"
        );
    }
    Ok(Json(build_shopping_list(&recipes)))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
