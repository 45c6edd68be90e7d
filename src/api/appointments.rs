//! Appointment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::appointment::{
        AppointmentDetails, AppointmentQuery, AvailabilityQuery, AvailabilityResponse, CreateAppointment,
        UpdateAppointment,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List appointments
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Appointments ordered by date and time", body = PaginatedResponse<AppointmentDetails>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<PaginatedResponse<AppointmentDetails>>> {
    let (appointments, total) = state.services.appointments.list(&query).await?;
    Ok(Json(PaginatedResponse::new(appointments, total, query.page, query.per_page)))
}

/// Get an appointment
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment details", body = AppointmentDetails),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AppointmentDetails>> {
    let appointment = state.services.appointments.get(id).await?;
    Ok(Json(appointment))
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment scheduled", body = AppointmentDetails),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Client, employee or service not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Employee already booked at that time", body = crate::error::ErrorResponse),
        (status = 422, description = "Inactive employee or service", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAppointment>,
) -> AppResult<(StatusCode, Json<AppointmentDetails>)> {
    claims.require_manager()?;

    let created = state.services.appointments.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit an appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    request_body = UpdateAppointment,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentDetails),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Employee already booked at that time", body = crate::error::ErrorResponse),
        (status = 422, description = "Appointment is closed to this change", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAppointment>,
) -> AppResult<Json<AppointmentDetails>> {
    claims.require_manager()?;

    let updated = state.services.appointments.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Completed appointments are kept", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_manager()?;

    state.services.appointments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Confirm a scheduled appointment
#[utoipa::path(
    post,
    path = "/appointments/{id}/confirm",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment confirmed", body = AppointmentDetails),
        (status = 403, description = "Assigned to another employee", body = crate::error::ErrorResponse),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Not in the scheduled state", body = crate::error::ErrorResponse)
    )
)]
pub async fn confirm_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AppointmentDetails>> {
    let current = state.services.appointments.get_by_id(id).await?;
    claims.require_assigned(current.employee_id)?;

    let confirmed = state.services.appointments.confirm(id).await?;
    Ok(Json(confirmed))
}

/// Complete an appointment, recording commission and client visit
#[utoipa::path(
    post,
    path = "/appointments/{id}/complete",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment completed", body = AppointmentDetails),
        (status = 403, description = "Assigned to another employee", body = crate::error::ErrorResponse),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Already completed or canceled", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AppointmentDetails>> {
    let current = state.services.appointments.get_by_id(id).await?;
    claims.require_assigned(current.employee_id)?;

    let completed = state.services.appointments.complete(id).await?;
    Ok(Json(completed))
}

/// Cancel an appointment and free its slot
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment canceled", body = AppointmentDetails),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Already completed or canceled", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AppointmentDetails>> {
    claims.require_manager()?;

    let canceled = state.services.appointments.cancel(id).await?;
    Ok(Json(canceled))
}

/// Free slots of an employee on a day
#[utoipa::path(
    get,
    path = "/appointments/availability",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots in chronological order", body = AvailabilityResponse),
        (status = 400, description = "Invalid date or duration", body = crate::error::ErrorResponse),
        (status = 404, description = "Employee or service not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let response = state.services.appointments.available_slots(&query).await?;
    Ok(Json(response))
}
