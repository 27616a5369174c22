use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;
use super::AppState;
use crate::dto::CreateWorkerDto;
use db::repository::workers as worker_repo;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<db::models::WorkerRow>>, StatusCode> {
    match worker_repo::list_workers(&state.pool).await {
        Ok(workers) => Ok(Json(workers)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn get(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<db::models::WorkerRow>, StatusCode> {
    match worker_repo::get_worker(&state.pool, id).await {
        Ok(worker) => Ok(Json(worker)),
        Err(db::DbError::NotFound) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkerDto>,
) -> Result<(StatusCode, Json<db::models::WorkerRow>), (StatusCode, String)> {
    let new_worker = payload
        .validate_now()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    match worker_repo::create_worker(&state.pool, &new_worker).await {
        Ok(worker) => {
            info!("registered worker {}", worker.id);
            Ok((StatusCode::CREATED, Json(worker)))
        }
        Err(db::DbError::Duplicate(_)) => Err((
            StatusCode::CONFLICT,
            format!("a worker with document number {} already exists", new_worker.document_number),
        )),
        Err(e) => {
            warn!("failed to create worker: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()))
        }
    }
}
