use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateProjectRequest, ProjectView, UpdateProjectRequest},
    repo_types::{NewProject, Project},
};
use crate::{
    auth::extractors::AdminUser,
    error::ApiError,
    response::Envelope,
    state::AppState,
    storage::{decode_image, HostedImage},
};

const PROJECT_FOLDER: &str = "projects";

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/project/:id", get(get_project))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/project/new", post(create_project))
        .route("/project/update/:id", put(update_project))
        .route("/project/delete/:id", delete(delete_project))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid project id"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn upload_image(state: &AppState, raw: &str) -> Result<HostedImage, ApiError> {
    let image = decode_image(raw).map_err(|e| {
        warn!(error = %e, "invalid project image");
        ApiError::validation("Invalid image")
    })?;
    state
        .storage
        .upload(PROJECT_FOLDER, image.body, &image.content_type)
        .await
        .map_err(|e| {
            error!(error = %e, "project image upload failed");
            ApiError::Internal(e)
        })
}

async fn load(state: &AppState, id: Uuid) -> Result<Project, ApiError> {
    state
        .projects
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Project"))
}

#[instrument(skip(state))]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    let projects = state.projects.list().await?;
    let items = projects.into_iter().map(ProjectView::from).collect();
    Ok(Json(Envelope::ok().with_projects(items)))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    let project = load(&state, parse_id(&id)?).await?;
    Ok(Json(Envelope::ok().with_project(project)))
}

#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn create_project(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let title = payload.title.trim().to_string();
    let description = payload.description.trim().to_string();
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::validation("Title and description are required"));
    }

    let image = match non_empty(payload.image) {
        Some(raw) => Some(upload_image(&state, &raw).await?),
        None => None,
    };

    let project = state
        .projects
        .create(NewProject {
            title,
            description,
            github_url: non_empty(payload.github_url),
            live_url: non_empty(payload.live_url),
            image,
        })
        .await?;

    info!(project_id = %project.id, "project created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::message("Project Added Successfully").with_project(project)),
    ))
}

#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn update_project(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<Envelope>, ApiError> {
    let mut project = load(&state, parse_id(&id)?).await?;

    if let Some(raw) = non_empty(payload.image) {
        let image = upload_image(&state, &raw).await?;
        if let Some(old) = project.image.replace(image) {
            if let Err(e) = state.storage.destroy(&old.public_id).await {
                error!(error = %e, "old project image destroy failed");
                return Err(ApiError::Internal(e));
            }
        }
    }
    if let Some(title) = non_empty(payload.title) {
        project.title = title;
    }
    if let Some(description) = non_empty(payload.description) {
        project.description = description;
    }
    if let Some(url) = payload.github_url {
        project.github_url = non_empty(Some(url));
    }
    if let Some(url) = payload.live_url {
        project.live_url = non_empty(Some(url));
    }

    state.projects.save(&project).await?;

    info!(project_id = %project.id, "project updated");
    Ok(Json(
        Envelope::message("Project Updated Successfully").with_project(project),
    ))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_project(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    let project = load(&state, parse_id(&id)?).await?;

    if let Some(image) = &project.image {
        state.storage.destroy(&image.public_id).await.map_err(|e| {
            error!(error = %e, "project image destroy failed");
            ApiError::Internal(e)
        })?;
    }
    state.projects.delete(project.id).await?;

    info!(project_id = %project.id, "project deleted");
    Ok(Json(Envelope::message("Project Deleted Successfully")))
}
