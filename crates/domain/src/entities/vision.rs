//! Structured results of image-analysis capability providers

use serde::{Deserialize, Serialize};

/// Overall sentiment read from a guest-submitted image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// General analysis of a guest-submitted image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImageAnalysis {
    /// Natural-language description of the image
    pub description: String,
    /// Objects recognized in the image
    pub objects: Vec<String>,
    /// Sentiment conveyed by the image
    pub sentiment: Sentiment,
    /// Operational insights for staff
    pub insights: Vec<String>,
    /// Provider confidence in [0, 1]
    pub confidence: f64,
}

/// Condition band derived from the cleanliness score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    /// Provider-failure fallback; never derived from a score
    Unknown,
}

impl RoomCondition {
    /// Derive the condition band from a 0-10 cleanliness score.
    ///
    /// Thresholds: >= 9 excellent, >= 8 good, >= 7 fair, else poor.
    pub const fn from_score(cleanliness: u8) -> Self {
        match cleanliness {
            9.. => Self::Excellent,
            8 => Self::Good,
            7 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RoomCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for RoomCondition {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Default for RoomQuality {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Housekeeping assessment of a room photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoomConditionAssessment {
    /// Cleanliness score, 0 (unusable) to 10 (spotless)
    pub cleanliness: u8,
    /// Condition band; derived from `cleanliness` except in the fallback case
    pub condition: RoomCondition,
    /// Issues spotted in the photo
    pub issues: Vec<String>,
    /// Suggested follow-up actions for staff
    pub recommendations: Vec<String>,
}

impl RoomConditionAssessment {
    /// Build an assessment, deriving the condition band from the score.
    ///
    /// Scores above 10 are clamped to 10.
    pub fn from_score(cleanliness: u8, issues: Vec<String>, recommendations: Vec<String>) -> Self {
        let cleanliness = cleanliness.min(10);
        Self {
            cleanliness,
            condition: RoomCondition::from_score(cleanliness),
            issues,
            recommendations,
        }
    }
}

/// Perceived quality tier of the room in a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomQuality {
    Luxury,
    Standard,
    Basic,
    /// Provider-failure fallback
    Unknown,
}

impl RoomQuality {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Luxury => "luxury",
            Self::Standard => "standard",
            Self::Basic => "basic",
            Self::Unknown => "unknown",
        }
    }
}

/// A single amenity recognized in a room photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedAmenity {
    /// Amenity name (e.g. "air conditioning")
    pub name: String,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
    /// Where in the room it was seen, if the provider says
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Amenity inventory derived from a room photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AmenityDetection {
    /// Recognized amenities, in provider order
    pub amenities: Vec<DetectedAmenity>,
    /// Room type as read from the photo (e.g. "double", "suite")
    pub room_type: String,
    /// Perceived quality tier
    pub quality: RoomQuality,
}
