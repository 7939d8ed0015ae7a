//! Ordered lookup tables mapping catalog text to codec indices
//!
//! The catalog is the implicit schema shared by encoder and decoder:
//! category order, per-category question order and response-label order
//! define the integer index space the coordinate packer folds into a
//! link. Both sides must load the same catalog or previously issued
//! links decode to the wrong items - the loader surfaces the catalog's
//! `metadata.version` so callers can log and compare, but the wire
//! format itself carries no version (kept bit-exact with issued links).
//!
//! Loaded from a JSON document; falls back to the built-in default
//! catalog when the file is absent or malformed.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::Profile;

/// Hard codec limits. These come from the coordinate packer's field
/// widths (3 + 8 + 3 + 3 bits) and the profile packer's 4-bit fields,
/// not from the UI. A catalog exceeding them produces silently wrong
/// encodings; the loader warns but does not reject.
pub const MAX_CATEGORIES: usize = 8;
pub const MAX_QUESTIONS_PER_CATEGORY: usize = 256;
pub const MAX_RESPONSES: usize = 8;
pub const MAX_PROFILE_OPTIONS: usize = 16;

/// Catalog document metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub version: String,
}

/// One category and its ordered question list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryData {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub questions: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Default selections applied when a decoded profile field is out of range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDefaults {
    pub position: String,
    pub pain_tolerance: String,
    pub experience: String,
}

/// Profile option lists (theoretical and practical experience share one list)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOptionsData {
    pub positions: Vec<String>,
    pub pain_tolerance: Vec<String>,
    pub experience: Vec<String>,
    #[serde(default)]
    pub defaults: Option<ProfileDefaults>,
}

/// On-disk catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    #[serde(default)]
    pub metadata: CatalogMetadata,
    pub responses: Vec<String>,
    pub categories: Vec<CategoryData>,
    pub profile: ProfileOptionsData,
    #[serde(default)]
    pub relationships: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Which profile field a lookup addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Position,
    PainTolerance,
    TheoreticalExperience,
    PracticalExperience,
}

/// Resolved catalog with forward and reverse index lookups
///
/// Only active categories participate in indexing, sorted by their
/// `order` field - the same ordering the questionnaire presents.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    categories: Vec<CategoryData>,
    responses: Vec<String>,
    profile: ProfileOptionsData,
    relationships: Vec<String>,
    locations: Vec<String>,
}

impl Catalog {
    /// Build a catalog from a parsed document, fixing the index space
    pub fn from_data(data: CatalogData) -> Self {
        let mut categories: Vec<CategoryData> =
            data.categories.into_iter().filter(|c| c.active).collect();
        categories.sort_by_key(|c| c.order);

        let catalog = Self {
            version: data.metadata.version,
            categories,
            responses: data.responses,
            profile: data.profile,
            relationships: data.relationships,
            locations: data.locations,
        };
        catalog.warn_on_codec_overflow();
        catalog
    }

    /// Parse a catalog from a JSON document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<CatalogData>(json).map(Self::from_data)
    }

    /// Load a catalog file, falling back to the built-in catalog when the
    /// file is absent or malformed
    pub fn load_or_builtin(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(catalog) => {
                    debug!(version = %catalog.version, path = %path.display(), "Catalog loaded");
                    catalog
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Catalog parse failed, using built-in defaults");
                    Self::builtin()
                }
            },
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Catalog read failed, using built-in defaults");
                Self::builtin()
            }
        }
    }

    fn warn_on_codec_overflow(&self) {
        if self.categories.len() > MAX_CATEGORIES {
            warn!(
                count = self.categories.len(),
                limit = MAX_CATEGORIES,
                "Catalog exceeds category limit; encodings will be wrong"
            );
        }
        for cat in &self.categories {
            if cat.questions.len() > MAX_QUESTIONS_PER_CATEGORY {
                warn!(
                    category = %cat.name,
                    count = cat.questions.len(),
                    limit = MAX_QUESTIONS_PER_CATEGORY,
                    "Catalog exceeds per-category question limit; encodings will be wrong"
                );
            }
        }
        if self.responses.len() > MAX_RESPONSES {
            warn!(
                count = self.responses.len(),
                limit = MAX_RESPONSES,
                "Catalog exceeds response limit; encodings will be wrong"
            );
        }
        for (name, list) in [
            ("positions", &self.profile.positions),
            ("painTolerance", &self.profile.pain_tolerance),
            ("experience", &self.profile.experience),
        ] {
            if list.len() > MAX_PROFILE_OPTIONS {
                warn!(
                    list = name,
                    count = list.len(),
                    limit = MAX_PROFILE_OPTIONS,
                    "Catalog exceeds profile option limit; encodings will be wrong"
                );
            }
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn category_name(&self, index: usize) -> Option<&str> {
        self.categories.get(index).map(|c| c.name.as_str())
    }

    /// Ordered question list for a category; empty for unknown categories
    pub fn questions(&self, category: &str) -> &[String] {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.questions.as_slice())
            .unwrap_or(&[])
    }

    pub fn question_index(&self, category: &str, question: &str) -> Option<usize> {
        self.questions(category).iter().position(|q| q == question)
    }

    pub fn question_text(&self, category_index: usize, question_index: usize) -> Option<&str> {
        self.categories
            .get(category_index)?
            .questions
            .get(question_index)
            .map(String::as_str)
    }

    pub fn response_index(&self, label: &str) -> Option<usize> {
        self.responses.iter().position(|r| r == label)
    }

    pub fn response_label(&self, index: usize) -> Option<&str> {
        self.responses.get(index).map(String::as_str)
    }

    /// Label substituted when a decoded response index is out of range
    pub fn fallback_response(&self) -> &str {
        self.responses.first().map(String::as_str).unwrap_or("N/A")
    }

    pub fn profile_options(&self, field: ProfileField) -> &[String] {
        match field {
            ProfileField::Position => &self.profile.positions,
            ProfileField::PainTolerance => &self.profile.pain_tolerance,
            ProfileField::TheoreticalExperience | ProfileField::PracticalExperience => {
                &self.profile.experience
            }
        }
    }

    pub fn profile_index(&self, field: ProfileField, label: &str) -> Option<usize> {
        self.profile_options(field).iter().position(|o| o == label)
    }

    pub fn profile_label(&self, field: ProfileField, index: usize) -> Option<&str> {
        self.profile_options(field).get(index).map(String::as_str)
    }

    /// Profile used when a decoded field does not resolve
    pub fn default_profile(&self) -> Profile {
        let first = |list: &[String]| list.first().cloned().unwrap_or_default();
        match &self.profile.defaults {
            Some(d) => Profile {
                position: d.position.clone(),
                pain_tolerance: d.pain_tolerance.clone(),
                theoretical_experience: d.experience.clone(),
                practical_experience: d.experience.clone(),
            },
            None => Profile {
                position: first(&self.profile.positions),
                pain_tolerance: first(&self.profile.pain_tolerance),
                theoretical_experience: first(&self.profile.experience),
                practical_experience: first(&self.profile.experience),
            },
        }
    }

    pub fn relationship_tags(&self) -> &[String] {
        &self.relationships
    }

    pub fn location_tags(&self) -> &[String] {
        &self.locations
    }

    /// Built-in default catalog, used when no external catalog loads
    pub fn builtin() -> Self {
        fn cat(name: &str, order: u32, questions: &[&str]) -> CategoryData {
            CategoryData {
                name: name.to_string(),
                icon: String::new(),
                active: true,
                order,
                questions: questions.iter().map(|q| q.to_string()).collect(),
            }
        }
        let strings = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        };

        Self::from_data(CatalogData {
            metadata: CatalogMetadata {
                version: "1.0.0".to_string(),
            },
            responses: strings(&[
                "N/A",
                "Accept",
                "Love",
                "Never tried",
                "Enjoy",
                "Tolerate",
                "Hard limit",
            ]),
            categories: vec![
                cat(
                    "Sexual acts",
                    1,
                    &[
                        "Oral sex",
                        "Penetrative sex",
                        "Mutual masturbation",
                        "Dirty talk",
                        "Filming or photography",
                    ],
                ),
                cat(
                    "Bondage",
                    2,
                    &[
                        "Rope bondage",
                        "Handcuffs",
                        "Spreader bars",
                        "Suspension",
                        "Blindfolds",
                        "Gags",
                    ],
                ),
                cat(
                    "Sadism & Masochism",
                    3,
                    &[
                        "Spanking",
                        "Flogging",
                        "Caning",
                        "Biting",
                        "Hot wax",
                        "Ice play",
                        "Clamps",
                    ],
                ),
                cat(
                    "Domination & Submission",
                    4,
                    &[
                        "Orders and obedience",
                        "Protocol and rituals",
                        "Kneeling",
                        "Begging",
                        "Orgasm control",
                    ],
                ),
                cat(
                    "Role play",
                    5,
                    &[
                        "Teacher and student",
                        "Doctor and patient",
                        "Strangers",
                        "Pet play",
                        "Uniforms",
                    ],
                ),
                cat(
                    "Fetishes",
                    6,
                    &["Feet", "Leather", "Latex", "Lingerie", "Stockings"],
                ),
                cat(
                    "Equipment",
                    7,
                    &["Collars", "Paddles", "Whips", "Vibrators", "Chastity devices"],
                ),
            ],
            profile: ProfileOptionsData {
                positions: strings(&["Top", "Switch", "Bottom"]),
                pain_tolerance: strings(&["Low", "Medium", "High"]),
                experience: strings(&["0-3 years", "3-5 years", "5+ years"]),
                defaults: Some(ProfileDefaults {
                    position: "Top".to_string(),
                    pain_tolerance: "Medium".to_string(),
                    experience: "0-3 years".to_string(),
                }),
            },
            relationships: strings(&["Monogamy", "Non-monogamy"]),
            locations: strings(&["Private", "Public"]),
        })
    }
}
