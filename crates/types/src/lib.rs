//! Shared domain vocabulary for the hospital management service.
//!
//! The enums here are the closed value sets the rest of the workspace relies
//! on. Persistence and API layers always convert through them, so an
//! out-of-range role, appointment status, or medicine form is rejected at the
//! boundary instead of travelling through the system as a raw string.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when a wire or database string does not name a known value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownValue {
    kind: &'static str,
    value: String,
}

impl UnknownValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Account roles recognised by the service.
///
/// The wire and storage form is the upper-case name (`ADMIN`, `DOCTOR`,
/// `PATIENT`), matching the role strings embedded in issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl Role {
    /// Returns the canonical wire/storage string for this role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Patient => "PATIENT",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "DOCTOR" => Ok(Role::Doctor),
            "PATIENT" => Ok(Role::Patient),
            other => Err(UnknownValue::new("role", other)),
        }
    }
}

/// Lifecycle states of an appointment.
///
/// Stored and serialised as `SCHEDULED`, `COMPLETED` or `CANCELLED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Returns the canonical wire/storage string for this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Transition rule for the appointment lifecycle.
    ///
    /// Re-asserting the current status is always allowed, so cancelling an
    /// already-cancelled appointment succeeds without changing history.
    /// Otherwise only scheduled appointments may move on; completed and
    /// cancelled are terminal.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        next == self || self == AppointmentStatus::Scheduled
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(AppointmentStatus::Scheduled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            other => Err(UnknownValue::new("appointment status", other)),
        }
    }
}

/// Dosage forms a medicine can be registered under.
///
/// Serialised with the capitalised human-readable name (`"Tablet"`,
/// `"Syrup"`, ...), which is also what the catalogue stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MedicineForm {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Cream,
    Ointment,
    Powder,
    Liquid,
    Spray,
    Drop,
}

impl MedicineForm {
    /// Returns the canonical wire/storage string for this form.
    pub const fn as_str(self) -> &'static str {
        match self {
            MedicineForm::Tablet => "Tablet",
            MedicineForm::Capsule => "Capsule",
            MedicineForm::Syrup => "Syrup",
            MedicineForm::Injection => "Injection",
            MedicineForm::Cream => "Cream",
            MedicineForm::Ointment => "Ointment",
            MedicineForm::Powder => "Powder",
            MedicineForm::Liquid => "Liquid",
            MedicineForm::Spray => "Spray",
            MedicineForm::Drop => "Drop",
        }
    }
}

impl std::fmt::Display for MedicineForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MedicineForm {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tablet" => Ok(MedicineForm::Tablet),
            "Capsule" => Ok(MedicineForm::Capsule),
            "Syrup" => Ok(MedicineForm::Syrup),
            "Injection" => Ok(MedicineForm::Injection),
            "Cream" => Ok(MedicineForm::Cream),
            "Ointment" => Ok(MedicineForm::Ointment),
            "Powder" => Ok(MedicineForm::Powder),
            "Liquid" => Ok(MedicineForm::Liquid),
            "Spray" => Ok(MedicineForm::Spray),
            "Drop" => Ok(MedicineForm::Drop),
            other => Err(UnknownValue::new("medicine form", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_form() {
        for role in [Role::Admin, Role::Doctor, Role::Patient] {
            let parsed: Role = role.as_str().parse().expect("canonical form should parse");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn role_rejects_unknown_and_lowercase_strings() {
        assert!("NURSE".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_serialises_as_upper_case_string() {
        let json = serde_json::to_string(&Role::Doctor).expect("serialise should succeed");
        assert_eq!(json, "\"DOCTOR\"");
        let back: Role = serde_json::from_str("\"PATIENT\"").expect("deserialise should succeed");
        assert_eq!(back, Role::Patient);
    }

    #[test]
    fn status_transitions_follow_the_lifecycle() {
        use AppointmentStatus::*;

        assert!(Scheduled.can_transition_to(Completed));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Scheduled));

        // Terminal states only allow re-asserting themselves.
        assert!(Completed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Scheduled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(Cancelled.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn status_round_trips_through_wire_form() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            let parsed: AppointmentStatus = status
                .as_str()
                .parse()
                .expect("canonical form should parse");
            assert_eq!(parsed, status);
        }
        assert!("PENDING".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn medicine_form_round_trips_and_rejects_unknown_values() {
        for form in [
            MedicineForm::Tablet,
            MedicineForm::Capsule,
            MedicineForm::Syrup,
            MedicineForm::Injection,
            MedicineForm::Cream,
            MedicineForm::Ointment,
            MedicineForm::Powder,
            MedicineForm::Liquid,
            MedicineForm::Spray,
            MedicineForm::Drop,
        ] {
            let parsed: MedicineForm = form.as_str().parse().expect("canonical form should parse");
            assert_eq!(parsed, form);
        }

        let err = "Gel".parse::<MedicineForm>().expect_err("Gel is not a known form");
        assert_eq!(err.to_string(), "unknown medicine form: Gel");
    }
}
