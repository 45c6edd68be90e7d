//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{appointments, auth, clients, employees, health, services, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salon API",
        version = "1.0.0",
        description = "Salon appointment scheduling REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        // Appointments
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::create_appointment,
        appointments::update_appointment,
        appointments::delete_appointment,
        appointments::confirm_appointment,
        appointments::complete_appointment,
        appointments::cancel_appointment,
        appointments::availability,
        // Clients
        clients::list_clients,
        clients::get_client,
        clients::create_client,
        clients::update_client,
        clients::delete_client,
        clients::client_appointments,
        // Employees
        employees::list_employees,
        employees::get_employee,
        employees::create_employee,
        employees::update_employee,
        employees::delete_employee,
        employees::list_specialties,
        employees::set_specialty,
        employees::remove_specialty,
        // Services
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::Role,
            // Appointments
            crate::models::appointment::Appointment,
            crate::models::appointment::AppointmentDetails,
            crate::models::appointment::AppointmentStatus,
            crate::models::appointment::CreateAppointment,
            crate::models::appointment::UpdateAppointment,
            crate::models::appointment::AvailabilityResponse,
            crate::scheduling::TimeSlot,
            // Clients
            crate::models::client::Client,
            crate::models::client::CreateClient,
            crate::models::client::UpdateClient,
            // Employees
            crate::models::employee::Employee,
            crate::models::employee::EmployeeStatus,
            crate::models::employee::CreateEmployee,
            crate::models::employee::UpdateEmployee,
            crate::models::employee::Specialty,
            crate::models::employee::SetSpecialty,
            // Services
            crate::models::service::Service,
            crate::models::service::CreateService,
            crate::models::service::UpdateService,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Staff accounts"),
        (name = "appointments", description = "Booking, lifecycle and availability"),
        (name = "clients", description = "Clients and visit history"),
        (name = "employees", description = "Employees and specialties"),
        (name = "services", description = "Service catalog")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_lifecycle_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/appointments",
            "/appointments/{id}/confirm",
            "/appointments/{id}/complete",
            "/appointments/{id}/cancel",
            "/appointments/availability",
            "/employees/{id}/specialties/{service_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
