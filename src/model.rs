use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A persisted record type owned by one whole-collection storage key.
///
/// Field names serialize in camelCase so the stored JSON matches what the
/// UI reads and writes; records persisted before a field was added simply
/// deserialize with that field's default.
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION_KEY: &'static str;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    /// Grade level as entered, e.g. "9". Kept as text; dashboards sort it
    /// numerically when they can.
    #[serde(default)]
    pub grade: String,
    /// Not validated against an existing class.
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub enrollment_date: String,
    #[serde(default)]
    pub guardian_name: String,
    #[serde(default)]
    pub guardian_phone: String,
    #[serde(default)]
    pub address: String,
}

impl Entity for Student {
    const COLLECTION_KEY: &'static str = "school_students";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub teacher_name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub academic_year: String,
    pub capacity: u32,
    #[serde(default)]
    pub schedule: String,
}

impl Entity for Class {
    const COLLECTION_KEY: &'static str = "school_classes";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: String,
    /// May reference a deleted student; lookups fall back to "Unknown".
    pub student_id: String,
    pub class_id: String,
    pub subject: String,
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub term: String,
}

impl Entity for Grade {
    const COLLECTION_KEY: &'static str = "school_grades";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Grade {
    pub fn percent(&self) -> f64 {
        if self.max_score > 0.0 {
            (self.score / self.max_score) * 100.0
        } else {
            0.0
        }
    }
}

/// Derived per-request on the dashboard; never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_classes: usize,
    pub total_teachers: usize,
    pub average_grade: f64,
}

/// The term choices the grade dialog offers. Free-entry terms are still
/// accepted and stored as-is.
pub const TERMS: [&str; 6] = ["Q1", "Q2", "Q3", "Q4", "Midterm", "Final"];
