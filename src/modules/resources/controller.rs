use anyhow::anyhow;
use axum::{
    Extension,
    extract::{Path, State},
};
use serde_json::{Map, Value};
use tracing::instrument;
use uuid::Uuid;

use docket_core::{AppError, PageParams, Paginated, Reply};
use docket_db::{Page, Resource};

use crate::middleware::access::{Access, RouteOptions, recheck_owner, sanitize};
use crate::state::{AppState, RoutedResource};
use crate::validator::JsonBody;

fn not_found<R: Resource>() -> AppError {
    AppError::not_found(anyhow!("{} not found", R::COLLECTION))
}

/// Route ids that are not UUIDs cannot name a record.
fn parse_id<R: Resource>(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found::<R>())
}

fn render_all<R: Resource>(records: &[R]) -> Result<Vec<Value>, AppError> {
    records
        .iter()
        .map(|record| record.render().map_err(AppError::from))
        .collect()
}

fn is_searchable<R: Resource>(field: &str) -> bool {
    !field.is_empty()
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !R::is_hidden(field)
}

#[instrument(skip_all, fields(collection = R::COLLECTION))]
pub async fn show<R: RoutedResource>(
    State(state): State<AppState>,
    Access(_): Access,
    Path(id): Path<String>,
) -> Result<Reply<Value>, AppError> {
    let id = parse_id::<R>(&id)?;
    let record = R::repository(&state)
        .get(id)
        .await?
        .ok_or_else(not_found::<R>)?;

    Ok(Reply::success(record.render()?))
}

#[instrument(skip_all, fields(collection = R::COLLECTION))]
pub async fn destroy<R: RoutedResource>(
    State(state): State<AppState>,
    Access(_): Access,
    Path(id): Path<String>,
) -> Result<Reply<Value>, AppError> {
    if let Ok(id) = Uuid::parse_str(&id) {
        R::repository(&state).destroy(id).await?;
    }

    Ok(Reply::success(Value::Null))
}

#[instrument(skip_all, fields(collection = R::COLLECTION))]
pub async fn paged<R: RoutedResource>(
    State(state): State<AppState>,
    Access(decision): Access,
    Extension(options): Extension<RouteOptions>,
    Path((page, limit)): Path<(String, String)>,
) -> Result<Reply<Paginated<Value>>, AppError> {
    let params = PageParams::parse(&page, &limit)?;
    let filter = decision.scope::<R>(&options);
    let repository = R::repository(&state);

    let records = repository
        .find_many(&filter, Some(Page::from(&params)))
        .await?;
    let total = repository.get_count(&filter).await?;

    Ok(Reply::success(Paginated::new(
        render_all(&records)?,
        total,
        &params,
    )))
}

#[instrument(skip_all, fields(collection = R::COLLECTION))]
pub async fn search<R: RoutedResource>(
    State(state): State<AppState>,
    Access(decision): Access,
    Extension(options): Extension<RouteOptions>,
    Path((field, term)): Path<(String, String)>,
) -> Result<Reply<Vec<Value>>, AppError> {
    if !is_searchable::<R>(&field) {
        return Err(AppError::bad_request(anyhow!("{} cannot be searched", field)));
    }

    let filter = decision.scope::<R>(&options);
    let records = R::repository(&state).search(&field, &term, &filter).await?;

    Ok(Reply::success(render_all(&records)?))
}

#[instrument(skip_all, fields(collection = R::COLLECTION))]
pub async fn update<R: RoutedResource>(
    State(state): State<AppState>,
    Access(decision): Access,
    Extension(options): Extension<RouteOptions>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Reply<Value>, AppError> {
    let id = body
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::bad_request(anyhow!("a valid id is required")))?;

    let decision = recheck_owner::<R>(&state, decision, id).await?;
    let mut patch = sanitize::<R>(&decision, &options, body);
    R::prepare_write(&mut patch);

    let record = R::repository(&state)
        .edit(id, patch)
        .await?
        .ok_or_else(not_found::<R>)?;

    Ok(Reply::success(record.render()?))
}

#[instrument(skip_all, fields(collection = R::COLLECTION))]
pub async fn store<R: RoutedResource>(
    State(state): State<AppState>,
    Access(decision): Access,
    Extension(options): Extension<RouteOptions>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Reply<Value>, AppError> {
    let mut document = sanitize::<R>(&decision, &options, body);
    R::prepare_write(&mut document);
    let record = R::repository(&state).store(document).await?;

    Ok(Reply::success(record.render()?))
}

#[instrument(skip_all, fields(collection = R::COLLECTION))]
pub async fn index<R: RoutedResource>(
    State(state): State<AppState>,
    Access(decision): Access,
    Extension(options): Extension<RouteOptions>,
) -> Result<Reply<Vec<Value>>, AppError> {
    let filter = decision.scope::<R>(&options);
    let records = R::repository(&state).find_many(&filter, None).await?;

    Ok(Reply::success(render_all(&records)?))
}
