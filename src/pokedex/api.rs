//! Pokedex API Endpoints
//! Mission: Public catalog browsing and search

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::pokedex::models::{PokemonDetails, PokemonListItem, PokemonListResponse};
use crate::pokedex::store::SortBy;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PokemonQuery {
    /// Search query to filter Pokemon by name or id
    pub query: Option<String>,
    /// Number of Pokemon to skip
    pub offset: Option<i64>,
    /// Number of Pokemon to return (1-100)
    pub limit: Option<i64>,
    /// Sort Pokemon by id or name
    pub sort_by: Option<SortBy>,
}

/// List/search the catalog - GET /pokemon
pub async fn list_pokemon(
    State(state): State<AppState>,
    Query(params): Query<PokemonQuery>,
) -> Result<Json<PokemonListResponse>, ApiError> {
    let offset = params.offset.unwrap_or(0).max(0);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let sort_by = params.sort_by.unwrap_or_default();

    let (count, records) = state
        .pokedex
        .search(params.query.as_deref(), offset, limit, sort_by)?;

    let results = records.iter().map(PokemonListItem::from_record).collect();

    let next = if offset + limit < count {
        Some(format!("offset={}&limit={}", offset + limit, limit))
    } else {
        None
    };
    let previous = if offset > 0 {
        Some(format!(
            "offset={}&limit={}",
            (offset - limit).max(0),
            limit
        ))
    } else {
        None
    };

    Ok(Json(PokemonListResponse {
        count,
        next,
        previous,
        results,
    }))
}

/// Get one Pokemon by name or id - GET /pokemon/:name_or_id
pub async fn get_pokemon(
    State(state): State<AppState>,
    Path(name_or_id): Path<String>,
) -> Result<Json<PokemonDetails>, ApiError> {
    let pokemon = state
        .pokedex
        .get(&name_or_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Pokemon '{name_or_id}' not found")))?;

    Ok(Json(PokemonDetails::from_record(&pokemon)))
}
