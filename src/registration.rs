//! Patient registration pipeline.
//!
//! Register assembles a patient document from raw form values: validate,
//! normalize the birth date, package the optional identification scan, and
//! submit everything in one create call. The attachment is embedded in the
//! patient document itself, so no partial-success state can exist.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{
    CreateUserInput, IdentificationDocument, Patient, RegisterPatientInput, User,
};
use crate::store::{collections, ListQuery, Persisted, RecordStore, StoreError};
use crate::validation::{self, FieldErrors};

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Registration validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Outcome of a successful registration: the stored patient plus the route
/// the caller should navigate to next (the booking flow).
#[derive(Debug)]
pub struct Registered {
    pub patient: Persisted<Patient>,
    pub booking_path: String,
}

pub struct RegistrationService {
    store: Arc<dyn RecordStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn create_user(&self, input: &CreateUserInput) -> Result<Persisted<User>, RegistrationError> {
        validation::validate_user(input).map_err(RegistrationError::Validation)?;

        let user = User {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.clone(),
        };

        let id = Uuid::new_v4().to_string();
        let record = self.store.create(collections::USERS, &id, &json_value(&user)?)?;
        let created = record.into_typed::<User>()?;
        tracing::info!(user_id = %created.id, "user created");
        Ok(created)
    }

    pub fn get_user(&self, user_id: &str) -> Result<Persisted<User>, RegistrationError> {
        let record = self.store.get(collections::USERS, user_id)?;
        Ok(record.into_typed()?)
    }

    /// Registers a patient from raw form values.
    ///
    /// Nothing is written when validation fails; on store failure the error
    /// is returned and the caller stays on the form with no retry.
    pub fn register(&self, input: &RegisterPatientInput) -> Result<Registered, RegistrationError> {
        let parsed = validation::validate_patient(input).map_err(RegistrationError::Validation)?;

        let identification_document = input.identification_document.as_ref().map(|upload| {
            let mime_type = upload
                .mime_type
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| {
                    mime_guess::from_path(&upload.file_name)
                        .first_or_octet_stream()
                        .essence_str()
                        .to_string()
                });
            IdentificationDocument {
                file_name: upload.file_name.clone(),
                mime_type,
                data: upload.data.clone(),
            }
        });

        let patient = Patient {
            user_id: input.user_id.clone(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.clone(),
            birth_date: parsed.birth_date,
            gender: parsed.gender,
            address: input.address.trim().to_string(),
            occupation: input.occupation.trim().to_string(),
            emergency_contact_name: input.emergency_contact_name.trim().to_string(),
            emergency_contact_number: input.emergency_contact_number.clone(),
            primary_physician: input.primary_physician.clone(),
            insurance_provider: input.insurance_provider.trim().to_string(),
            insurance_policy_number: input.insurance_policy_number.trim().to_string(),
            allergies: input.allergies.clone(),
            current_medication: input.current_medication.clone(),
            family_medical_history: input.family_medical_history.clone(),
            past_medical_history: input.past_medical_history.clone(),
            identification_type: parsed.identification_type,
            identification_number: input.identification_number.clone(),
            identification_document,
            treatment_consent: input.treatment_consent,
            disclosure_consent: input.disclosure_consent,
            privacy_consent: input.privacy_consent,
        };

        let id = Uuid::new_v4().to_string();
        let record = self.store.create(collections::PATIENTS, &id, &json_value(&patient)?)?;
        let patient = record.into_typed::<Patient>()?;

        tracing::info!(
            patient_id = %patient.id,
            user_id = %input.user_id,
            has_identification = patient.document.identification_document.is_some(),
            "patient registered"
        );

        Ok(Registered {
            booking_path: format!("/patients/{}/new-appointment", input.user_id),
            patient,
        })
    }

    /// Looks up the patient registered for a user account.
    pub fn get_patient(&self, user_id: &str) -> Result<Persisted<Patient>, RegistrationError> {
        let page = self
            .store
            .list(collections::PATIENTS, &ListQuery::equals("user_id", user_id))?;

        let record = page
            .documents
            .into_iter()
            .next()
            .ok_or_else(|| RegistrationError::NotFound(user_id.to_string()))?;
        Ok(record.into_typed()?)
    }
}

fn json_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, RegistrationError> {
    serde_json::to_value(value).map_err(|e| {
        RegistrationError::Store(StoreError::Unavailable(format!("serialization: {e}")))
    })
}
