use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{Gender, IdentificationType};

/// Patient document as persisted in the patients collection.
///
/// The identification scan, when provided, is embedded directly in the
/// document so registration stays a single create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: Option<String>,
    pub current_medication: Option<String>,
    pub family_medical_history: Option<String>,
    pub past_medical_history: Option<String>,
    pub identification_type: Option<IdentificationType>,
    pub identification_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification_document: Option<IdentificationDocument>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

/// Scanned identification document embedded in the patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationDocument {
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Uploaded identification file as it arrives from the form.
///
/// The MIME type is optional here; the registration pipeline falls back to
/// guessing from the file name.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentificationUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Raw registration form values. Everything arrives as strings; the
/// validation layer parses dates and enumerated fields.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPatientInput {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub current_medication: Option<String>,
    #[serde(default)]
    pub family_medical_history: Option<String>,
    #[serde(default)]
    pub past_medical_history: Option<String>,
    #[serde(default)]
    pub identification_type: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
    #[serde(default)]
    pub identification_document: Option<IdentificationUpload>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

/// Serde helper: binary payloads cross as standard base64 strings.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identification_document_base64_round_trip() {
        let doc = IdentificationDocument {
            file_name: "passport.png".into(),
            mime_type: "image/png".into(),
            data: vec![0x89, 0x50, 0x4E, 0x47],
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["data"], "iVBORw==");

        let back: IdentificationDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn patient_without_document_serializes_no_attachment_field() {
        let patient = Patient {
            user_id: "u1".into(),
            name: "Jan Kowalski".into(),
            email: "jan@example.com".into(),
            phone: "+14155552671".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            gender: Gender::Male,
            address: "10th Street, Springfield".into(),
            occupation: "Software Engineer".into(),
            emergency_contact_name: "Anna Kowalska".into(),
            emergency_contact_number: "+14155552672".into(),
            primary_physician: "Dr. Jane Powell".into(),
            insurance_provider: "Red Cross".into(),
            insurance_policy_number: "ABC123456789".into(),
            allergies: None,
            current_medication: None,
            family_medical_history: None,
            past_medical_history: None,
            identification_type: Some(IdentificationType::Passport),
            identification_number: Some("123456789".into()),
            identification_document: None,
            treatment_consent: true,
            disclosure_consent: true,
            privacy_consent: true,
        };

        let json = serde_json::to_value(&patient).unwrap();
        assert!(json.get("identification_document").is_none());
    }
}
