//! # API REST
//!
//! REST API for the hospital management service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Bearer-token authentication and role checks at the handler boundary
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Business rules live in `hms-core`; this crate translates HTTP in and out.

#![warn(rust_2018_idioms)]

use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hms_core::TokenService;

pub mod error;
pub mod extract;
pub mod routes;

/// Application state shared by all request handlers.
///
/// Carries the connection pool, the token service used to verify and issue
/// bearer tokens, and the bcrypt cost applied when registering accounts.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub tokens: TokenService,
    pub bcrypt_cost: u32,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health,
        routes::auth::register,
        routes::auth::login,
        routes::auth::logout,
        routes::auth::my_patient_record,
        routes::auth::save_patient_record,
        routes::users::get_profile,
        routes::users::update_profile,
        routes::doctors::list_doctors,
        routes::doctors::create_doctor,
        routes::doctors::my_profile,
        routes::doctors::update_my_profile,
        routes::doctors::my_schedule,
        routes::doctors::update_availability,
        routes::doctors::get_doctor,
        routes::doctors::update_doctor,
        routes::doctors::doctor_appointments,
        routes::patients::list_patients,
        routes::patients::register_patient,
        routes::patients::get_patient,
        routes::patients::update_patient,
        routes::patients::patient_appointments,
        routes::appointments::list_appointments,
        routes::appointments::book_appointment,
        routes::appointments::get_appointment,
        routes::appointments::update_appointment,
        routes::appointments::cancel_appointment,
        routes::medicines::list_medicines,
        routes::medicines::create_medicine,
        routes::medicines::get_medicine,
        routes::medicines::update_medicine,
        routes::medicines::delete_medicine,
        routes::prescriptions::list_prescriptions,
        routes::prescriptions::create_prescription,
        routes::prescriptions::get_prescription,
        routes::prescriptions::update_prescription,
        routes::prescriptions::add_medicines,
        routes::prescriptions::remove_medicine,
        routes::admin::get_dashboard,
        routes::admin::get_reports,
    ),
    components(schemas(
        routes::HealthRes,
        routes::MessageRes,
        routes::auth::RegisterReq,
        routes::auth::LoginReq,
        routes::auth::AuthUserInfo,
        routes::auth::AuthRes,
        routes::auth::PatientRecordRes,
        routes::auth::SavePatientRes,
        routes::users::ProfileUpdateReq,
        routes::users::ProfileRes,
        routes::doctors::DoctorListRes,
        routes::doctors::CreateDoctorReq,
        routes::doctors::DoctorRes,
        routes::doctors::DoctorUpdateReq,
        routes::doctors::MyProfileReq,
        routes::doctors::ScheduleRes,
        routes::doctors::AvailabilityReq,
        routes::patients::PatientFields,
        routes::patients::PatientListRes,
        routes::patients::RegisterPatientReq,
        routes::patients::PatientRes,
        routes::appointments::AppointmentListRes,
        routes::appointments::BookReq,
        routes::appointments::BookedRes,
        routes::appointments::StatusReq,
        routes::medicines::MedicineListRes,
        routes::medicines::MedicineReq,
        routes::medicines::MedicineCreatedRes,
        routes::prescriptions::PrescriptionListRes,
        routes::prescriptions::CreatePrescriptionReq,
        routes::prescriptions::PrescriptionCreatedRes,
        routes::prescriptions::NotesReq,
        routes::prescriptions::MedicineLineReq,
        routes::prescriptions::MedicineLinesReq,
        routes::admin::DashboardRes,
        routes::admin::ReportsRes,
        hms_core::model::UserAccount,
        hms_core::model::DoctorProfile,
        hms_core::model::PatientProfile,
        hms_core::model::Appointment,
        hms_core::model::AppointmentSummary,
        hms_core::model::ScheduleEntry,
        hms_core::model::Medicine,
        hms_core::model::PrescriptionSummary,
        hms_core::model::PrescriptionLine,
        hms_core::model::PrescriptionDetail,
        hms_core::reports::DashboardCounts,
        hms_core::reports::TopDoctor,
        hms_core::reports::StatusCount,
        hms_core::reports::SpecializationCount,
        hms_core::reports::Reports,
        hms_types::Role,
        hms_types::AppointmentStatus,
        hms_types::MedicineForm,
    ))
)]
struct ApiDoc;

/// Build the full application router with Swagger UI and permissive CORS.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::doctors::router())
        .merge(routes::patients::router())
        .merge(routes::appointments::router())
        .merge(routes::medicines::router())
        .merge(routes::prescriptions::router())
        .merge(routes::admin::router())
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
