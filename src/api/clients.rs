//! Client endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        appointment::{AppointmentDetails, AppointmentQuery},
        client::{Client, ClientQuery, CreateClient, UpdateClient},
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Search clients
#[utoipa::path(
    get,
    path = "/clients",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(ClientQuery),
    responses(
        (status = 200, description = "Matching clients", body = PaginatedResponse<Client>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_clients(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ClientQuery>,
) -> AppResult<Json<PaginatedResponse<Client>>> {
    let (clients, total) = state.services.clients.search(&query).await?;
    Ok(Json(PaginatedResponse::new(clients, total, query.page, query.per_page)))
}

/// Get a client with visit metrics
#[utoipa::path(
    get,
    path = "/clients/{id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client details", body = Client),
        (status = 404, description = "Client not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_client(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Client>> {
    let client = state.services.clients.get_by_id(id).await?;
    Ok(Json(client))
}

/// Register a client
#[utoipa::path(
    post,
    path = "/clients",
    tag = "clients",
    security(("bearer_auth" = [])),
    request_body = CreateClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_client(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<Client>)> {
    claims.require_manager()?;

    let created = state.services.clients.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update client contact details
#[utoipa::path(
    put,
    path = "/clients/{id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    request_body = UpdateClient,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 404, description = "Client not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_client(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateClient>,
) -> AppResult<Json<Client>> {
    claims.require_manager()?;

    let updated = state.services.clients.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete a client without appointments
#[utoipa::path(
    delete,
    path = "/clients/{id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Client has appointments", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_client(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_manager()?;

    state.services.clients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Appointment history of a client
#[utoipa::path(
    get,
    path = "/clients/{id}/appointments",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Client ID"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 50)")
    ),
    responses(
        (status = 200, description = "Appointments of the client", body = PaginatedResponse<AppointmentDetails>),
        (status = 404, description = "Client not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn client_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<PaginatedResponse<AppointmentDetails>>> {
    let (appointments, total) = state.services.clients.appointments(id, &query).await?;
    Ok(Json(PaginatedResponse::new(appointments, total, query.page, query.per_page)))
}
