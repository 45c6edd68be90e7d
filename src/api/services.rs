//! Service catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::service::{CreateService, Service, ServiceQuery, UpdateService},
};

use super::AuthenticatedUser;

/// List services
#[utoipa::path(
    get,
    path = "/services",
    tag = "services",
    security(("bearer_auth" = [])),
    params(ServiceQuery),
    responses(
        (status = 200, description = "Services ordered by name", body = Vec<Service>)
    )
)]
pub async fn list_services(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ServiceQuery>,
) -> AppResult<Json<Vec<Service>>> {
    let services = state.services.catalog.list(&query).await?;
    Ok(Json(services))
}

/// Get a service
#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "services",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service details", body = Service),
        (status = 404, description = "Service not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Service>> {
    let service = state.services.catalog.get_by_id(id).await?;
    Ok(Json(service))
}

/// Add a service to the catalog
#[utoipa::path(
    post,
    path = "/services",
    tag = "services",
    security(("bearer_auth" = [])),
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Manager privileges required")
    )
)]
pub async fn create_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    claims.require_manager()?;

    let created = state.services.catalog.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a service
#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "services",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    request_body = UpdateService,
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 404, description = "Service not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateService>,
) -> AppResult<Json<Service>> {
    claims.require_manager()?;

    let updated = state.services.catalog.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete a service nobody booked
#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "services",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 404, description = "Service not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Service has appointments", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_manager()?;

    state.services.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
