use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(DoctorId);
id_newtype!(EventId);

/// A single appointment in a doctor's schedule.
///
/// `appointment_time` is an opaque slot token; it is only ever compared for
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: EventId,
    pub patient_name: String,
    pub appointment_time: String,
}

impl Event {
    pub fn new(
        event_id: impl Into<String>,
        patient_name: impl Into<String>,
        appointment_time: impl Into<String>,
    ) -> Self {
        Self {
            event_id: EventId::new(event_id),
            patient_name: patient_name.into(),
            appointment_time: appointment_time.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub clinic_name: String,
    pub specialty: String,
    #[serde(rename = "event", default)]
    pub events: Vec<Event>,
}

/// Where a renamed event lands in its doctor's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenamePolicy {
    /// Remove the old record and append the replacement.
    #[default]
    MoveToEnd,
    InPlace,
}

impl FromStr for RenamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move_to_end" | "move-to-end" => Ok(Self::MoveToEnd),
            "in_place" | "in-place" => Ok(Self::InPlace),
            other => Err(format!("unknown rename policy '{other}'")),
        }
    }
}
