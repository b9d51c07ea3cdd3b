use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, instrument, warn};

use crate::location::{Coordinates, LocationError};
use crate::recipes::repo;
use crate::state::AppState;

use super::dto::{HistoryItem, Suggestion, TodayQuery};
use super::services::{self, HISTORY_KEY};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suggestions/today", get(today))
        .route("/suggestions/history", get(history))
}

/// Location → weather → catalog → cached-or-fresh suggestion, strictly in
/// that order. Each failure is caught here and mapped to a plain message;
/// nothing past this handler ever sees one.
#[instrument(skip(state))]
pub async fn today(
    State(state): State<AppState>,
    Query(q): Query<TodayQuery>,
) -> Result<Json<Suggestion>, (StatusCode, String)> {
    let coords = match (q.lat, q.lon) {
        (Some(latitude), Some(longitude)) => Coordinates {
            latitude,
            longitude,
        },
        _ => match state.location.current_position().await {
            Ok(coords) => coords,
            Err(e @ LocationError::PermissionDenied) => {
                warn!("suggestion request without a usable location");
                return Err((StatusCode::FORBIDDEN, e.to_string()));
            }
        },
    };

    let weather = match state
        .weather
        .current(coords.latitude, coords.longitude)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(error = %e, "weather fetch failed");
            return Err((StatusCode::BAD_GATEWAY, e.to_string()));
        }
    };

    let catalog = match repo::list_all(&state.db).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "catalog fetch failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let mut rng = StdRng::from_entropy();
    let suggestion =
        services::resolve_today(state.kv.as_ref(), Some(&weather), &catalog, &mut rng).await;
    Ok(Json(suggestion))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryItem>>, (StatusCode, String)> {
    match state.kv.get(HISTORY_KEY).await {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryItem>>(&raw) {
            Ok(items) => Ok(Json(items)),
            Err(e) => {
                warn!(error = %e, "unreadable history, serving empty");
                Ok(Json(Vec::new()))
            }
        },
        Ok(None) => Ok(Json(Vec::new())),
        Err(e) => {
            // La pantalla sigue funcionando aunque el almacenamiento falle.
            warn!(error = %e, "history read failed, serving empty");
            Ok(Json(Vec::new()))
        }
    }
}
