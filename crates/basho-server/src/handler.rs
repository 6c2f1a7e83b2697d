use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use basho_index::Basho;
use basho_types::code;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub basho: Arc<Basho>,
    cache_control: HeaderValue,
}

impl AppState {
    pub fn new(basho: Arc<Basho>, config: &ServerConfig) -> ServerResult<Self> {
        let cache_control = HeaderValue::from_str(&config.cache_control())
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(Self {
            basho,
            cache_control,
        })
    }

    fn cached<T: Serialize>(&self, body: T) -> Response {
        (
            [(header::CACHE_CONTROL, self.cache_control.clone())],
            Json(body),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct NamedCode<C> {
    pub code: C,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PostalEntry {
    pub code: String,
    pub prefecture: Option<String>,
    pub city: String,
    pub town: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    pub code: Option<String>,
}

/// `GET /prefectures`
pub async fn list_prefectures(State(state): State<AppState>) -> Response {
    let body: Vec<NamedCode<u8>> = state
        .basho
        .prefectures()
        .into_iter()
        .map(|p| NamedCode {
            code: p.code,
            name: p.name,
        })
        .collect();
    state.cached(body)
}

/// `GET /prefectures/:code/cities`
///
/// The code must be written without a leading zero (`1`..`47`); anything else
/// is a 404 with an empty list.
pub async fn list_cities(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let prefecture = code::parse_prefecture_code(&raw).and_then(|c| state.basho.prefecture(c));
    let Some(prefecture) = prefecture else {
        return (StatusCode::NOT_FOUND, Json(Vec::<NamedCode<String>>::new())).into_response();
    };
    let body: Vec<NamedCode<String>> = state
        .basho
        .cities_of(&prefecture)
        .into_iter()
        .map(|c| NamedCode {
            code: c.code,
            name: c.name,
        })
        .collect();
    state.cached(body)
}

/// `GET /postal_codes/lookup?code=1540011`
///
/// A missing, malformed, or unknown code yields an empty list.
pub async fn lookup_postal_code(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Json<Vec<PostalEntry>> {
    let Some(raw) = params.code else {
        return Json(Vec::new());
    };
    let entries = state
        .basho
        .postal_codes(&raw)
        .into_iter()
        .map(|p| PostalEntry {
            prefecture: state.basho.prefecture_of_postal(&p).map(|pref| pref.name),
            code: p.code,
            city: p.city_name,
            town: p.town,
        })
        .collect();
    Json(entries)
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
