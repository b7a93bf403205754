use serde::{Deserialize, Serialize};

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(IdentificationType {
    BirthCertificate => "birth_certificate",
    DriversLicense => "drivers_license",
    MedicalInsuranceCard => "medical_insurance_card",
    MilitaryIdCard => "military_id_card",
    NationalIdentityCard => "national_identity_card",
    Passport => "passport",
    ResidentAlienCard => "resident_alien_card",
    SocialSecurityCard => "social_security_card",
    StateIdCard => "state_id_card",
    StudentIdCard => "student_id_card",
    VoterIdCard => "voter_id_card",
});

str_enum!(ChangeKind {
    Schedule => "schedule",
    Cancel => "cancel",
});

/// Appointment status.
///
/// Deliberately not generated by `str_enum!`: stored documents may carry a
/// status outside the known set, and such records must still flow through
/// listings. Deserialization maps unknown values to `Unrecognized`;
/// `FromStr` (used on inbound patches) rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Cancelled,
    #[serde(other)]
    Unrecognized,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Whether the status machine permits moving to `next`.
    ///
    /// Permitted: pending→scheduled, pending→cancelled, scheduled→cancelled,
    /// and scheduled→scheduled (reschedule). `cancelled` is terminal, and an
    /// unrecognized stored status cannot transition anywhere.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Scheduled)
                | (Self::Pending, Self::Cancelled)
                | (Self::Scheduled, Self::Cancelled)
                | (Self::Scheduled, Self::Scheduled)
        )
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(InvalidEnumValue {
                field: "AppointmentStatus".into(),
                value: s.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_round_trip() {
        for (variant, s) in [
            (Gender::Male, "male"),
            (Gender::Female, "female"),
            (Gender::Other, "other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Gender::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn identification_type_round_trip() {
        for (variant, s) in [
            (IdentificationType::BirthCertificate, "birth_certificate"),
            (IdentificationType::DriversLicense, "drivers_license"),
            (IdentificationType::Passport, "passport"),
            (IdentificationType::VoterIdCard, "voter_id_card"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(IdentificationType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn status_from_str_rejects_unknown() {
        assert!(AppointmentStatus::from_str("no_show").is_err());
        assert!(AppointmentStatus::from_str("").is_err());
        assert!(AppointmentStatus::from_str("unrecognized").is_err());
    }

    #[test]
    fn status_deserialize_maps_unknown_to_unrecognized() {
        let status: AppointmentStatus = serde_json::from_str("\"no_show\"").unwrap();
        assert_eq!(status, AppointmentStatus::Unrecognized);

        let status: AppointmentStatus = serde_json::from_str("\"scheduled\"").unwrap();
        assert_eq!(status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn transition_table() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Scheduled));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Scheduled));

        assert!(!Pending.can_transition_to(Pending));
        assert!(!Scheduled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!Cancelled.can_transition_to(Cancelled));
        assert!(!Unrecognized.can_transition_to(Scheduled));
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Gender::from_str("unknown").is_err());
        assert!(IdentificationType::from_str("library_card").is_err());
        assert!(ChangeKind::from_str("reschedule").is_err());
    }
}
