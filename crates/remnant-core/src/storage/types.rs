//! Core data types for the archive store.
//!
//! Profile names and metadata are plain. Reflection text and media payloads
//! are envelopes; the store never looks inside them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RemnantError;

/// Kind of relationship a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    Undefined,
    Romantic,
    Friendship,
    Family,
    Professional,
    Other,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 6] = [
        RelationshipType::Undefined,
        RelationshipType::Romantic,
        RelationshipType::Friendship,
        RelationshipType::Family,
        RelationshipType::Professional,
        RelationshipType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Undefined => "Undefined",
            RelationshipType::Romantic => "Romantic",
            RelationshipType::Friendship => "Friendship",
            RelationshipType::Family => "Family",
            RelationshipType::Professional => "Professional",
            RelationshipType::Other => "Other",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = RemnantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .or_else(|| wanted.eq_ignore_ascii_case("work").then_some(Self::Professional))
            .ok_or_else(|| {
                RemnantError::InvalidInput(format!("Unknown relationship type: {}", s))
            })
    }
}

/// A titled section of reflection text on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReflectionSection {
    Overview,
    Timeline,
    Thoughts,
    Lessons,
    Patterns,
    Closure,
}

impl ReflectionSection {
    pub const ALL: [ReflectionSection; 6] = [
        ReflectionSection::Overview,
        ReflectionSection::Timeline,
        ReflectionSection::Thoughts,
        ReflectionSection::Lessons,
        ReflectionSection::Patterns,
        ReflectionSection::Closure,
    ];

    /// Short identifier used on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            ReflectionSection::Overview => "overview",
            ReflectionSection::Timeline => "timeline",
            ReflectionSection::Thoughts => "thoughts",
            ReflectionSection::Lessons => "lessons",
            ReflectionSection::Patterns => "patterns",
            ReflectionSection::Closure => "closure",
        }
    }

    /// Human-facing title.
    pub fn title(&self) -> &'static str {
        match self {
            ReflectionSection::Overview => "Overview",
            ReflectionSection::Timeline => "Timeline",
            ReflectionSection::Thoughts => "Thoughts & Feelings",
            ReflectionSection::Lessons => "Lessons Learned",
            ReflectionSection::Patterns => "Patterns & Boundaries",
            ReflectionSection::Closure => "Closure / Release",
        }
    }
}

impl fmt::Display for ReflectionSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for ReflectionSection {
    type Err = RemnantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|section| {
                section.slug().eq_ignore_ascii_case(wanted)
                    || section.title().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| RemnantError::InvalidInput(format!("Unknown section: {}", s)))
    }
}

/// A relationship profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier for this profile
    pub id: Uuid,

    /// Display name (stored plain for list views)
    pub name: String,

    pub relationship_type: RelationshipType,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    /// Section text, each value a base64 envelope
    pub reflections: BTreeMap<ReflectionSection, String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create an empty profile with a fresh id.
    pub fn new(name: impl Into<String>, relationship_type: RelationshipType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            relationship_type,
            start_date: None,
            end_date: None,
            reflections: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A media attachment owned by a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: Uuid,

    /// Owning profile
    pub profile_id: Uuid,

    pub mime_type: String,

    /// Envelope bytes
    pub blob: Vec<u8>,

    pub timestamp: DateTime<Utc>,
}

/// Media metadata without the envelope bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSummary {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub mime_type: String,

    /// Length of the stored envelope, not the plaintext
    pub sealed_len: usize,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_type_parse() {
        assert_eq!(
            "romantic".parse::<RelationshipType>().unwrap(),
            RelationshipType::Romantic
        );
        assert_eq!(
            "Work".parse::<RelationshipType>().unwrap(),
            RelationshipType::Professional
        );
        assert!("enemy".parse::<RelationshipType>().is_err());
    }

    #[test]
    fn test_section_parse_slug_and_title() {
        assert_eq!(
            "lessons".parse::<ReflectionSection>().unwrap(),
            ReflectionSection::Lessons
        );
        assert_eq!(
            "Closure / Release".parse::<ReflectionSection>().unwrap(),
            ReflectionSection::Closure
        );
        assert!("epilogue".parse::<ReflectionSection>().is_err());
    }

    #[test]
    fn test_reflections_serialize_as_object() {
        let mut profile = Profile::new("Sam", RelationshipType::Friendship);
        profile
            .reflections
            .insert(ReflectionSection::Overview, "ZW52ZWxvcGU=".to_string());

        let json = serde_json::to_value(&profile.reflections).unwrap();
        assert_eq!(json["Overview"], "ZW52ZWxvcGU=");
    }
}
