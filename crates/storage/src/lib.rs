use anyhow::{bail, Context, Result};
use std::{
    collections::HashSet,
    fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{Doctor, DoctorId, Event};

/// In-memory clinic registry. Clones share the same doctors.
///
/// The doctor list is fixed once built; only each doctor's event list
/// changes, behind that doctor's own lock.
#[derive(Clone)]
pub struct Registry {
    doctors: Arc<[DoctorRecord]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorProfile {
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub clinic_name: String,
    pub specialty: String,
}

#[derive(Debug)]
pub struct DoctorRecord {
    profile: DoctorProfile,
    events: Mutex<Vec<Event>>,
}

impl DoctorRecord {
    fn new(doctor: Doctor) -> Self {
        let Doctor {
            doctor_id,
            doctor_name,
            clinic_name,
            specialty,
            events,
        } = doctor;
        Self {
            profile: DoctorProfile {
                doctor_id,
                doctor_name,
                clinic_name,
                specialty,
            },
            events: Mutex::new(events),
        }
    }

    pub fn profile(&self) -> &DoctorProfile {
        &self.profile
    }

    pub fn doctor_id(&self) -> &DoctorId {
        &self.profile.doctor_id
    }

    /// Locks this doctor's schedule. Hold the guard across a whole
    /// check-then-mutate sequence.
    pub fn events(&self) -> MutexGuard<'_, Vec<Event>> {
        // Every mutation is a single push/remove/assign, so a panicked holder
        // cannot leave a half-written list behind.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Doctor {
        let DoctorProfile {
            doctor_id,
            doctor_name,
            clinic_name,
            specialty,
        } = self.profile().clone();
        Doctor {
            doctor_id,
            doctor_name,
            clinic_name,
            specialty,
            events: self.events().clone(),
        }
    }
}

impl Registry {
    /// The startup dataset: one doctor with two booked appointments.
    pub fn seeded() -> Self {
        let doctors = seed_doctors()
            .into_iter()
            .map(DoctorRecord::new)
            .collect::<Vec<_>>();
        Self {
            doctors: doctors.into(),
        }
    }

    pub fn from_doctors(doctors: Vec<Doctor>) -> Result<Self> {
        validate_doctors(&doctors)?;
        let records = doctors
            .into_iter()
            .map(DoctorRecord::new)
            .collect::<Vec<_>>();
        Ok(Self {
            doctors: records.into(),
        })
    }

    /// Loads a JSON seed file holding a list of doctors in wire shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
        let doctors: Vec<Doctor> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse seed file '{}'", path.display()))?;
        Self::from_doctors(doctors)
            .with_context(|| format!("invalid seed file '{}'", path.display()))
    }

    pub fn find_doctor(&self, doctor_id: &DoctorId) -> Option<&DoctorRecord> {
        self.doctors
            .iter()
            .find(|record| record.doctor_id() == doctor_id)
    }

    pub fn doctors(&self) -> impl Iterator<Item = &DoctorRecord> {
        self.doctors.iter()
    }

    pub fn doctor_count(&self) -> usize {
        self.doctors.len()
    }

    pub fn snapshot(&self) -> Vec<Doctor> {
        self.doctors.iter().map(DoctorRecord::snapshot).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::seeded()
    }
}

pub fn seed_doctors() -> Vec<Doctor> {
    vec![Doctor {
        doctor_id: DoctorId::new("1"),
        doctor_name: "Angela".into(),
        clinic_name: "CMU-clinic".into(),
        specialty: "vaccine-department".into(),
        events: vec![
            Event::new("1", "Alex", "9:30"),
            Event::new("2", "Chang", "15:30"),
        ],
    }]
}

fn validate_doctors(doctors: &[Doctor]) -> Result<()> {
    let mut doctor_ids = HashSet::new();
    for doctor in doctors {
        if !doctor_ids.insert(&doctor.doctor_id) {
            bail!("duplicate doctor id '{}'", doctor.doctor_id);
        }

        let mut event_ids = HashSet::new();
        let mut slots = HashSet::new();
        for event in &doctor.events {
            if !event_ids.insert(&event.event_id) {
                bail!(
                    "doctor '{}' has duplicate event id '{}'",
                    doctor.doctor_id,
                    event.event_id
                );
            }
            if !slots.insert(event.appointment_time.as_str()) {
                bail!(
                    "doctor '{}' has two events at '{}'",
                    doctor.doctor_id,
                    event.appointment_time
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
