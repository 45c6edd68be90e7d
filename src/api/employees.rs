//! Employee and specialty endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::employee::{CreateEmployee, Employee, EmployeeQuery, SetSpecialty, Specialty, UpdateEmployee},
};

use super::AuthenticatedUser;

/// List employees
#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees ordered by name", body = Vec<Employee>),
        (status = 400, description = "Invalid status filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_employees(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = state.services.employees.list(&query).await?;
    Ok(Json(employees))
}

/// Get an employee
#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee details", body = Employee),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.employees.get_by_id(id).await?;
    Ok(Json(employee))
}

/// Hire an employee
#[utoipa::path(
    post,
    path = "/employees",
    tag = "employees",
    security(("bearer_auth" = [])),
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Manager privileges required")
    )
)]
pub async fn create_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    claims.require_manager()?;

    let created = state.services.employees.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateEmployee>,
) -> AppResult<Json<Employee>> {
    claims.require_manager()?;

    let updated = state.services.employees.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete an employee without appointments
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Employee ID")
    ),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Employee has appointments", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_employee(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_manager()?;

    state.services.employees.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Services an employee performs
#[utoipa::path(
    get,
    path = "/employees/{id}/specialties",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Specialties with commission rates", body = Vec<Specialty>),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_specialties(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Specialty>>> {
    let specialties = state.services.employees.specialties(id).await?;
    Ok(Json(specialties))
}

/// Add a specialty or change its commission rate
#[utoipa::path(
    put,
    path = "/employees/{id}/specialties",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Employee ID")
    ),
    request_body = SetSpecialty,
    responses(
        (status = 200, description = "Specialty stored", body = Specialty),
        (status = 400, description = "Rate outside 0-100", body = crate::error::ErrorResponse),
        (status = 404, description = "Employee or service not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_specialty(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<SetSpecialty>,
) -> AppResult<Json<Specialty>> {
    claims.require_manager()?;

    let specialty = state.services.employees.set_specialty(id, data).await?;
    Ok(Json(specialty))
}

/// Remove a specialty
#[utoipa::path(
    delete,
    path = "/employees/{id}/specialties/{service_id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Employee ID"),
        ("service_id" = i32, Path, description = "Service ID")
    ),
    responses(
        (status = 204, description = "Specialty removed"),
        (status = 404, description = "No such specialty", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_specialty(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, service_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    claims.require_manager()?;

    state.services.employees.remove_specialty(id, service_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
