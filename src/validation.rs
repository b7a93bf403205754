//! Form-schema validation for intake inputs.
//!
//! Pure and synchronous: raw form values in, a field→message map out.
//! Date and enum parsing happens here so the pipelines downstream only see
//! typed values.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;

use crate::models::{
    AppointmentChanges, AppointmentPatch, AppointmentStatus, CreateAppointmentInput,
    CreateUserInput, Gender, IdentificationType, RegisterPatientInput, PHYSICIANS,
};

/// E.164-style phone numbers: leading `+`, 10–15 digits.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[1-9]\d{9,14}$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        // First violation per field wins, matching form-level display.
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ─── Shared field rules ───────────────────────────────────────────────────────

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize, max: usize) {
    let len = value.trim().chars().count();
    if len < min {
        errors.push(field, format!("Must be at least {min} characters"));
    } else if len > max {
        errors.push(field, format!("Must be at most {max} characters"));
    }
}

fn check_optional_length(errors: &mut FieldErrors, field: &str, value: &Option<String>, max: usize) {
    if let Some(value) = value {
        if value.chars().count() > max {
            errors.push(field, format!("Must be at most {max} characters"));
        }
    }
}

fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if !EMAIL_RE.is_match(value) {
        errors.push(field, "Invalid email address");
    }
}

fn check_phone(errors: &mut FieldErrors, field: &str, value: &str) {
    if !PHONE_RE.is_match(value) {
        errors.push(field, "Invalid phone number");
    }
}

fn check_physician(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "Select at least one doctor");
    } else if !PHYSICIANS.contains(&value) {
        errors.push(field, "Unknown physician");
    }
}

fn parse_schedule(errors: &mut FieldErrors, field: &str, value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            errors.push(field, "Invalid schedule date");
            None
        }
    }
}

// ─── User ─────────────────────────────────────────────────────────────────────

pub fn validate_user(input: &CreateUserInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    check_length(&mut errors, "name", &input.name, 2, 50);
    check_email(&mut errors, "email", &input.email);
    check_phone(&mut errors, "phone", &input.phone);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ─── Patient registration ─────────────────────────────────────────────────────

/// Typed values recovered while validating a registration form.
#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub identification_type: Option<IdentificationType>,
}

pub fn validate_patient(input: &RegisterPatientInput) -> Result<ValidatedRegistration, FieldErrors> {
    let mut errors = FieldErrors::default();

    if input.user_id.trim().is_empty() {
        errors.push("user_id", "User reference is required");
    }

    check_length(&mut errors, "name", &input.name, 2, 50);
    check_email(&mut errors, "email", &input.email);
    check_phone(&mut errors, "phone", &input.phone);

    let birth_date = match NaiveDate::parse_from_str(&input.birth_date, "%Y-%m-%d") {
        Ok(date) => {
            if date > Utc::now().date_naive() {
                errors.push("birth_date", "Birth date cannot be in the future");
            }
            Some(date)
        }
        Err(_) => {
            errors.push("birth_date", "Invalid birth date");
            None
        }
    };

    let gender = match Gender::from_str(&input.gender) {
        Ok(g) => Some(g),
        Err(_) => {
            errors.push("gender", "Select a valid gender option");
            None
        }
    };

    check_length(&mut errors, "address", &input.address, 5, 500);
    check_length(&mut errors, "occupation", &input.occupation, 2, 500);
    check_length(
        &mut errors,
        "emergency_contact_name",
        &input.emergency_contact_name,
        2,
        50,
    );
    check_phone(
        &mut errors,
        "emergency_contact_number",
        &input.emergency_contact_number,
    );
    check_physician(&mut errors, "primary_physician", &input.primary_physician);
    check_length(&mut errors, "insurance_provider", &input.insurance_provider, 2, 50);
    check_length(
        &mut errors,
        "insurance_policy_number",
        &input.insurance_policy_number,
        2,
        50,
    );

    check_optional_length(&mut errors, "allergies", &input.allergies, 500);
    check_optional_length(&mut errors, "current_medication", &input.current_medication, 500);
    check_optional_length(
        &mut errors,
        "family_medical_history",
        &input.family_medical_history,
        500,
    );
    check_optional_length(
        &mut errors,
        "past_medical_history",
        &input.past_medical_history,
        500,
    );

    let identification_type = match &input.identification_type {
        Some(raw) => match IdentificationType::from_str(raw) {
            Ok(kind) => Some(kind),
            Err(_) => {
                errors.push("identification_type", "Invalid identification type");
                None
            }
        },
        None => None,
    };

    if let Some(number) = &input.identification_number {
        check_length(&mut errors, "identification_number", number, 2, 50);
    }

    if let Some(upload) = &input.identification_document {
        if upload.file_name.trim().is_empty() {
            errors.push("identification_document", "File name is required");
        } else if upload.data.is_empty() {
            errors.push("identification_document", "Identification document is empty");
        }
    }

    if !input.treatment_consent {
        errors.push(
            "treatment_consent",
            "You must consent to treatment in order to proceed",
        );
    }
    if !input.disclosure_consent {
        errors.push(
            "disclosure_consent",
            "You must consent to disclosure in order to proceed",
        );
    }
    if !input.privacy_consent {
        errors.push(
            "privacy_consent",
            "You must consent to privacy in order to proceed",
        );
    }

    match (birth_date, gender) {
        (Some(birth_date), Some(gender)) if errors.is_empty() => Ok(ValidatedRegistration {
            birth_date,
            gender,
            identification_type,
        }),
        _ => Err(errors),
    }
}

// ─── Appointments ─────────────────────────────────────────────────────────────

/// Validates a booking request; returns the parsed schedule timestamp.
pub fn validate_create_appointment(
    input: &CreateAppointmentInput,
) -> Result<DateTime<Utc>, FieldErrors> {
    let mut errors = FieldErrors::default();

    if input.patient_id.trim().is_empty() {
        errors.push("patient_id", "Patient reference is required");
    }
    check_physician(&mut errors, "physician", &input.physician);
    let schedule = parse_schedule(&mut errors, "schedule", &input.schedule);
    check_length(&mut errors, "reason", &input.reason, 2, 500);
    check_optional_length(&mut errors, "note", &input.note, 500);

    match schedule {
        Some(schedule) if errors.is_empty() => Ok(schedule),
        _ => Err(errors),
    }
}

/// Validates a partial update and parses its typed fields.
///
/// Transition legality is the lifecycle service's concern; this only checks
/// field shapes.
pub fn validate_appointment_patch(patch: &AppointmentPatch) -> Result<AppointmentChanges, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut changes = AppointmentChanges::default();

    if let Some(physician) = &patch.physician {
        check_physician(&mut errors, "physician", physician);
        changes.physician = Some(physician.clone());
    }
    if let Some(schedule) = &patch.schedule {
        changes.schedule = parse_schedule(&mut errors, "schedule", schedule);
    }
    if let Some(reason) = &patch.reason {
        check_length(&mut errors, "reason", reason, 2, 500);
        changes.reason = Some(reason.clone());
    }
    if let Some(note) = &patch.note {
        if note.chars().count() > 500 {
            errors.push("note", "Must be at most 500 characters");
        }
        changes.note = Some(note.clone());
    }
    if let Some(status) = &patch.status {
        match AppointmentStatus::from_str(status) {
            Ok(status) => changes.status = Some(status),
            Err(_) => errors.push("status", "Invalid status value"),
        }
    }
    if let Some(reason) = &patch.cancellation_reason {
        check_length(&mut errors, "cancellation_reason", reason, 2, 500);
        changes.cancellation_reason = Some(reason.clone());
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}
