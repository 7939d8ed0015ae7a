//! Core data types shared by the codec, the resolver and the store

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShareLinkError};

/// One answered questionnaire item
///
/// Holds catalog text, not indices - the codec resolves text to indices on
/// encode and back on decode. An answer whose text is no longer in the
/// catalog cannot be encoded and is dropped by the payload assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Category name
    pub category: String,
    /// Question text within the category
    pub question: String,
    /// Response label for the giving direction
    pub give: String,
    /// Response label for the receiving direction
    pub receive: String,
}

impl Answer {
    pub fn new(category: &str, question: &str, give: &str, receive: &str) -> Self {
        Self {
            category: category.to_string(),
            question: question.to_string(),
            give: give.to_string(),
            receive: receive.to_string(),
        }
    }
}

/// Profile selections packed alongside the answer set
///
/// Each field is one option from its catalog list; the codec packs the
/// four option indices into a single 16-bit word (4 bits each, so each
/// list holds at most 16 options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub position: String,
    pub pain_tolerance: String,
    pub theoretical_experience: String,
    pub practical_experience: String,
}

/// Everything one participant shares for comparison
///
/// This is the payload of a remote record and of a fallback blob, and the
/// shape handed to the external compatibility analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedResult {
    pub answers: Vec<Answer>,
    pub profile: Profile,
    #[serde(default)]
    pub relationship_tags: Vec<String>,
    #[serde(default)]
    pub location_tags: Vec<String>,
}

impl SharedResult {
    pub fn new(answers: Vec<Answer>, profile: Profile) -> Self {
        Self {
            answers,
            profile,
            relationship_tags: Vec::new(),
            location_tags: Vec::new(),
        }
    }

    /// Structural validation applied to results arriving from outside
    /// (fallback blobs): an answer-less result is not comparable.
    pub fn validate(&self) -> Result<()> {
        if self.answers.is_empty() {
            return Err(ShareLinkError::Decode(
                "shared result contains no answers".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile {
            position: "Top".to_string(),
            pain_tolerance: "Medium".to_string(),
            theoretical_experience: "0-3 years".to_string(),
            practical_experience: "0-3 years".to_string(),
        }
    }

    #[test]
    fn test_shared_result_camel_case_wire_format() {
        let result = SharedResult::new(
            vec![Answer::new("Bondage", "Rope", "Love", "Accept")],
            sample_profile(),
        );
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("relationshipTags"));
        assert!(json.contains("locationTags"));
        assert!(json.contains("painTolerance"));
        assert!(!json.contains("pain_tolerance"));
    }

    #[test]
    fn test_validate_rejects_empty_answers() {
        let result = SharedResult::new(vec![], sample_profile());
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_tags_default_when_absent() {
        let json = r#"{
            "answers": [{"category":"c","question":"q","give":"g","receive":"r"}],
            "profile": {
                "position":"Top","painTolerance":"Medium",
                "theoreticalExperience":"0-3 years","practicalExperience":"0-3 years"
            }
        }"#;
        let result: SharedResult = serde_json::from_str(json).unwrap();
        assert!(result.relationship_tags.is_empty());
        assert!(result.location_tags.is_empty());
    }
}
