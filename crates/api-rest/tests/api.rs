//! End-to-end tests driving the full router over HTTP, one in-memory
//! database per test.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api_rest::{app, AppState};
use hms_core::{db, TokenService};

const PASSWORD: &str = "Str0ngPass1";

async fn test_app() -> Router {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("pool should open");
    db::apply_schema(&pool).await.expect("schema should apply");
    app(AppState {
        pool,
        tokens: TokenService::new("integration-test-secret", chrono::Duration::hours(24)),
        // Minimum cost keeps the hashing fast in tests.
        bcrypt_cost: 4,
    })
}

fn req(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should complete");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should read")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

/// Register an account and hand back its bearer token.
async fn register(app: &Router, name: &str, email: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        req(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "password": PASSWORD,
                "contactNo": "1234567890",
                "role": role,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"]
        .as_str()
        .expect("token should be present")
        .to_owned()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        req(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"]
        .as_str()
        .expect("token should be present")
        .to_owned()
}

/// Register a patient and complete their record; the returned token carries
/// the patient id.
async fn patient_with_record(app: &Router, name: &str, email: &str) -> (String, i64) {
    let token = register(app, name, email, "PATIENT").await;
    let (status, body) = send(
        app,
        req(
            "POST",
            "/auth/register/patient",
            Some(&token),
            Some(json!({ "gender": "female", "dateOfBirth": "1990-04-02" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "patient record failed: {body}");
    let token = body["token"]
        .as_str()
        .expect("token should be present")
        .to_owned();
    let patient_id = body["patientId"].as_i64().expect("patientId should be set");
    (token, patient_id)
}

/// Create a doctor through the admin endpoint and return its id.
async fn create_doctor(app: &Router, admin: &str, email: &str) -> i64 {
    let (status, body) = send(
        app,
        req(
            "POST",
            "/doctor",
            Some(admin),
            Some(json!({
                "name": "Greg House",
                "email": email,
                "password": PASSWORD,
                "contactNo": "1234567890",
                "specialization": "Diagnostics",
                "experienceYrs": 12,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "doctor create failed: {body}");
    body["doctor"]["doctorId"]
        .as_i64()
        .expect("doctorId should be set")
}

async fn book(app: &Router, patient: &str, doctor_id: i64, when: &str) -> (StatusCode, Value) {
    send(
        app,
        req(
            "POST",
            "/appointment",
            Some(patient),
            Some(json!({ "doctorId": doctor_id, "apptDate": when, "reason": "checkup" })),
        ),
    )
    .await
}

#[tokio::test]
async fn health_answers_without_a_token() {
    let app = test_app().await;
    let (status, body) = send(&app, req("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "HMS REST API is alive");
}

#[tokio::test]
async fn protected_endpoints_reject_missing_and_garbage_tokens() {
    let app = test_app().await;

    for uri in ["/appointment", "/doctor", "/medicine", "/user/profile"] {
        let (status, body) = send(&app, req("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} without token");
        assert_eq!(body["error"], "Unauthorized");
    }

    let (status, _) = send(&app, req("GET", "/doctor", Some("not-a-token"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_validates_input_and_rejects_duplicates() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": "Alice", "email": "alice@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "name": "Alice",
                "email": "not-an-email",
                "password": PASSWORD,
                "contactNo": "1234567890",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "weak",
                "contactNo": "1234567890",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Password must be at least 8 characters with uppercase, lowercase, and numbers"
    );

    register(&app, "Alice", "alice@example.com", "PATIENT").await;

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "name": "Also Alice",
                "email": "alice@example.com",
                "password": PASSWORD,
                "contactNo": "1234567890",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");

    // Unknown email and wrong password fail the same way.
    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "WrongPass1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn booking_collides_on_the_exact_slot_only() {
    let app = test_app().await;
    let admin = register(&app, "Root", "root@example.com", "ADMIN").await;
    let doctor_id = create_doctor(&app, &admin, "greg@example.com").await;
    let (alice, _) = patient_with_record(&app, "Alice", "alice@example.com").await;
    let (bob, _) = patient_with_record(&app, "Bob", "bob@example.com").await;

    let (status, body) = book(&app, &alice, doctor_id, "2025-01-10T09:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED, "first booking: {body}");
    assert_eq!(body["message"], "Appointment booked successfully");
    assert!(body["appointmentId"].is_i64());

    let (status, body) = book(&app, &bob, doctor_id, "2025-01-10T09:00:00Z").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Doctor is not available at this time");

    let (status, _) = book(&app, &bob, doctor_id, "2025-01-10T10:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);

    // A registered patient without a completed record cannot book.
    let carol = register(&app, "Carol", "carol@example.com", "PATIENT").await;
    let (status, body) = book(&app, &carol, doctor_id, "2025-01-11T09:00:00Z").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Patient profile not found");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/appointment",
            Some(&alice),
            Some(json!({ "doctorId": doctor_id, "apptDate": "next tuesday" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid appointment date");
}

#[tokio::test]
async fn appointment_lifecycle_enforces_ownership_and_finality() {
    let app = test_app().await;
    let admin = register(&app, "Root", "root@example.com", "ADMIN").await;
    let doctor_id = create_doctor(&app, &admin, "greg@example.com").await;
    let doctor = login(&app, "greg@example.com").await;
    let (alice, alice_id) = patient_with_record(&app, "Alice", "alice@example.com").await;
    let (bob, _) = patient_with_record(&app, "Bob", "bob@example.com").await;

    let (_, body) = book(&app, &alice, doctor_id, "2025-01-10T09:00:00Z").await;
    let appointment = format!("/appointment/{}", body["appointmentId"]);

    // Bob is not on this appointment.
    let (status, _) = send(&app, req("GET", &appointment, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, req("DELETE", &appointment, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        req(
            "PUT",
            &appointment,
            Some(&bob),
            Some(json!({ "status": "CANCELLED" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nor may he read Alice's patient record.
    let (status, _) = send(
        &app,
        req("GET", &format!("/patient/{alice_id}"), Some(&bob), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Patients cancel; they do not complete.
    let (status, _) = send(
        &app,
        req(
            "PUT",
            &appointment,
            Some(&alice),
            Some(json!({ "status": "COMPLETED" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, req("DELETE", &appointment, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment cancelled successfully");

    // Cancelling twice is a no-op success.
    let (status, _) = send(&app, req("DELETE", &appointment, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Cancelled is terminal.
    let (status, body) = send(
        &app,
        req(
            "PUT",
            &appointment,
            Some(&doctor),
            Some(json!({ "status": "COMPLETED" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot change a CANCELLED appointment");

    let (status, body) = send(
        &app,
        req(
            "PUT",
            &appointment,
            Some(&admin),
            Some(json!({ "status": "PENDING" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status");
}

#[tokio::test]
async fn walkthrough_from_registration_to_prescription() {
    let app = test_app().await;
    let admin = register(&app, "Root", "root@example.com", "ADMIN").await;
    let doctor_id = create_doctor(&app, &admin, "greg@example.com").await;
    let doctor = login(&app, "greg@example.com").await;
    let (alice, _) = patient_with_record(&app, "Alice", "alice@example.com").await;

    let (_, body) = book(&app, &alice, doctor_id, "2025-01-10T09:00:00Z").await;
    let appointment_id = body["appointmentId"].as_i64().expect("appointment id");

    // The doctor sees the booking on their schedule and completes it.
    let (status, body) = send(&app, req("GET", "/doctor/schedule", Some(&doctor), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schedule"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["schedule"][0]["patientName"], "Alice");

    let (status, body) = send(
        &app,
        req(
            "PUT",
            &format!("/appointment/{appointment_id}"),
            Some(&doctor),
            Some(json!({ "status": "COMPLETED" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "complete failed: {body}");
    assert_eq!(body["message"], "Appointment updated successfully");

    // Catalogue work is the admin's.
    let (status, body) = send(
        &app,
        req(
            "POST",
            "/medicine",
            Some(&admin),
            Some(json!({ "name": "Paracetamol", "form": "Tablet", "details": "500mg" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "medicine failed: {body}");
    let medicine_id = body["medicineId"].as_i64().expect("medicine id");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/prescription",
            Some(&doctor),
            Some(json!({ "appointmentId": appointment_id, "notes": "rest and fluids" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "prescription failed: {body}");
    assert_eq!(body["message"], "Prescription created successfully");
    let prescription_id = body["prescriptionId"].as_i64().expect("prescription id");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/prescription-medicine",
            Some(&doctor),
            Some(json!({
                "prescriptionId": prescription_id,
                "medicines": [{
                    "medicineId": medicine_id,
                    "dose": "500mg",
                    "duration": "5 days",
                    "instructions": "after meals",
                }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "lines failed: {body}");
    assert_eq!(body["message"], "Medicines added to prescription successfully");

    // Alice sees exactly her one prescription, lines included.
    let (status, body) = send(&app, req("GET", "/prescription", Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["prescriptions"][0]["prescriptionId"], prescription_id);

    let (status, body) = send(
        &app,
        req(
            "GET",
            &format!("/prescription/{prescription_id}"),
            Some(&alice),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointmentId"], appointment_id);
    assert_eq!(body["notes"], "rest and fluids");
    assert_eq!(body["medicines"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["medicines"][0]["dose"], "500mg");
    assert_eq!(body["medicines"][0]["name"], "Paracetamol");
}

#[tokio::test]
async fn prescription_creation_is_idempotent_and_scoped() {
    let app = test_app().await;
    let admin = register(&app, "Root", "root@example.com", "ADMIN").await;
    let doctor_id = create_doctor(&app, &admin, "greg@example.com").await;
    let doctor = login(&app, "greg@example.com").await;
    let (alice, _) = patient_with_record(&app, "Alice", "alice@example.com").await;
    let (bob, _) = patient_with_record(&app, "Bob", "bob@example.com").await;

    let (_, body) = book(&app, &alice, doctor_id, "2025-01-10T09:00:00Z").await;
    let appointment_id = body["appointmentId"].as_i64().expect("appointment id");

    // Patients cannot prescribe.
    let (status, _) = send(
        &app,
        req(
            "POST",
            "/prescription",
            Some(&alice),
            Some(json!({ "appointmentId": appointment_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/prescription",
            Some(&doctor),
            Some(json!({ "appointmentId": appointment_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let prescription_id = body["prescriptionId"].as_i64().expect("prescription id");

    // Asking again returns the existing prescription instead of failing.
    let (status, body) = send(
        &app,
        req(
            "POST",
            "/prescription",
            Some(&doctor),
            Some(json!({ "appointmentId": appointment_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Prescription already exists");
    assert_eq!(body["prescriptionId"], prescription_id);

    // Bob was never part of this appointment.
    let (status, _) = send(
        &app,
        req(
            "GET",
            &format!("/prescription/{prescription_id}"),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, req("GET", "/prescription", Some(&bob), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    // An incomplete line is rejected with the field list.
    let (status, body) = send(
        &app,
        req(
            "POST",
            "/prescription-medicine",
            Some(&doctor),
            Some(json!({
                "prescriptionId": prescription_id,
                "medicines": [{ "dose": "500mg" }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Medicine ID, dose, and duration are required for each medicine"
    );
}

#[tokio::test]
async fn medicine_catalogue_guards_roles_names_and_references() {
    let app = test_app().await;
    let admin = register(&app, "Root", "root@example.com", "ADMIN").await;
    let doctor_id = create_doctor(&app, &admin, "greg@example.com").await;
    let doctor = login(&app, "greg@example.com").await;

    // Writes are admin only.
    let (status, _) = send(
        &app,
        req(
            "POST",
            "/medicine",
            Some(&doctor),
            Some(json!({ "name": "Ibuprofen", "form": "Tablet" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/medicine",
            Some(&admin),
            Some(json!({ "name": "Ibuprofen", "form": "Chewable" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid medicine form");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/medicine",
            Some(&admin),
            Some(json!({ "name": "Ibuprofen", "form": "Tablet" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let medicine_id = body["medicineId"].as_i64().expect("medicine id");

    // Names are unique ignoring case.
    let (status, body) = send(
        &app,
        req(
            "POST",
            "/medicine",
            Some(&admin),
            Some(json!({ "name": "IBUPROFEN", "form": "Syrup" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Medicine with this name already exists");

    // Wire the medicine into a prescription, then deletion must refuse.
    let (alice, _) = patient_with_record(&app, "Alice", "alice@example.com").await;
    let (_, body) = book(&app, &alice, doctor_id, "2025-01-10T09:00:00Z").await;
    let appointment_id = body["appointmentId"].as_i64().expect("appointment id");
    let (_, body) = send(
        &app,
        req(
            "POST",
            "/prescription",
            Some(&doctor),
            Some(json!({ "appointmentId": appointment_id })),
        ),
    )
    .await;
    let prescription_id = body["prescriptionId"].as_i64().expect("prescription id");
    let (status, _) = send(
        &app,
        req(
            "POST",
            "/prescription-medicine",
            Some(&doctor),
            Some(json!({
                "prescriptionId": prescription_id,
                "medicines": [{ "medicineId": medicine_id, "dose": "200mg", "duration": "3 days" }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        req(
            "DELETE",
            &format!("/medicine/{medicine_id}"),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Cannot delete medicine that is used in prescriptions"
    );

    // Dropping the line frees the medicine for deletion.
    let (status, _) = send(
        &app,
        req(
            "DELETE",
            &format!(
                "/prescription-medicine?prescriptionId={prescription_id}&medicineId={medicine_id}"
            ),
            Some(&doctor),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        req(
            "DELETE",
            &format!("/medicine/{medicine_id}"),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Medicine deleted successfully");

    let (status, body) = send(
        &app,
        req(
            "GET",
            &format!("/medicine/{medicine_id}"),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Medicine not found");
}

#[tokio::test]
async fn doctor_availability_window_round_trips() {
    let app = test_app().await;
    let admin = register(&app, "Root", "root@example.com", "ADMIN").await;
    create_doctor(&app, &admin, "greg@example.com").await;
    let doctor = login(&app, "greg@example.com").await;
    let (alice, _) = patient_with_record(&app, "Alice", "alice@example.com").await;

    // Any signed-in user may browse the directory.
    let (status, body) = send(&app, req("GET", "/doctor", Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["specialization"], "Diagnostics");

    // Only doctors set availability, and both ends are required.
    let (status, _) = send(
        &app,
        req(
            "PUT",
            "/doctor/schedule",
            Some(&alice),
            Some(json!({ "availableFrom": "2025-01-01T08:00:00Z", "availableTo": "2025-12-31T17:00:00Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        req(
            "PUT",
            "/doctor/schedule",
            Some(&doctor),
            Some(json!({ "availableFrom": "2025-01-01T08:00:00Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing availability");

    let (status, body) = send(
        &app,
        req(
            "PUT",
            "/doctor/schedule",
            Some(&doctor),
            Some(json!({ "availableFrom": "2025-01-01T08:00:00Z", "availableTo": "2025-12-31T17:00:00Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "availability failed: {body}");
    assert_eq!(body["message"], "Availability updated");

    let (status, body) = send(&app, req("GET", "/doctor/schedule", Some(&doctor), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availableFrom"], "2025-01-01T08:00:00Z");
    assert_eq!(body["availableTo"], "2025-12-31T17:00:00Z");
}

#[tokio::test]
async fn admin_aggregates_require_the_admin_role() {
    let app = test_app().await;
    let admin = register(&app, "Root", "root@example.com", "ADMIN").await;
    let doctor_id = create_doctor(&app, &admin, "greg@example.com").await;
    let doctor = login(&app, "greg@example.com").await;
    let (alice, _) = patient_with_record(&app, "Alice", "alice@example.com").await;
    book(&app, &alice, doctor_id, "2025-01-10T09:00:00Z").await;

    for token in [&doctor, &alice] {
        let (status, body) = send(&app, req("GET", "/admin/dashboard", Some(token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");
    }

    let (status, body) = send(&app, req("GET", "/admin/dashboard", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statistics"]["totalDoctors"], 1);
    assert_eq!(body["statistics"]["totalPatients"], 1);
    assert_eq!(body["statistics"]["totalAppointments"], 1);
    assert_eq!(body["statistics"]["scheduledAppointments"], 1);

    let (status, body) = send(&app, req("GET", "/admin/reports", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reports"]["topDoctors"][0]["appointmentCount"], 1);
    assert_eq!(
        body["reports"]["specializations"][0]["specialization"],
        "Diagnostics"
    );
}

#[tokio::test]
async fn account_profile_updates_keep_absent_fields() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "PATIENT").await;

    let (status, body) = send(&app, req("GET", "/user/profile", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["contactNo"], "1234567890");

    let (status, body) = send(
        &app,
        req(
            "PUT",
            "/user/profile",
            Some(&token),
            Some(json!({ "name": "Alice Woods" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["name"], "Alice Woods");
    assert_eq!(body["user"]["contactNo"], "1234567890");

    // A blank field is treated as absent, not as an overwrite.
    let (status, body) = send(
        &app,
        req(
            "PUT",
            "/user/profile",
            Some(&token),
            Some(json!({ "name": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice Woods");
}

#[tokio::test]
async fn patient_record_upsert_reissues_the_token() {
    let app = test_app().await;
    let token = register(&app, "Alice", "alice@example.com", "PATIENT").await;

    // No record yet.
    let (status, body) = send(
        &app,
        req("GET", "/auth/register/patient", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Patient record not found");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/register/patient",
            Some(&token),
            Some(json!({ "bloodGroup": "O+", "dateOfBirth": "1990-04-02" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Patient saved");
    let fresh = body["token"].as_str().expect("token should be present").to_owned();
    let patient_id = body["patientId"].as_i64().expect("patientId should be set");

    // Saving again updates in place rather than duplicating the record.
    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/register/patient",
            Some(&fresh),
            Some(json!({ "city": "Springfield" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patientId"], patient_id);

    let (status, body) = send(
        &app,
        req("GET", "/auth/register/patient", Some(&fresh), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["bloodGroup"], "O+");
    assert_eq!(body["patient"]["city"], "Springfield");
    assert_eq!(body["patient"]["dateOfBirth"], "1990-04-02");

    let (status, body) = send(
        &app,
        req(
            "POST",
            "/auth/register/patient",
            Some(&fresh),
            Some(json!({ "dateOfBirth": "yesterday" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date of birth");
}
