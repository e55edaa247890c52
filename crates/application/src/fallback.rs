//! Safe fallback values for capability-provider failures
//!
//! Guest-facing flows must degrade gracefully: a provider outage surfaces
//! as a logged failure for operations staff and a plain-language fallback
//! for the guest, never as a hard error mid-conversation. The whole policy
//! lives in this one table, keyed by [`ProcessingType`].

use domain::{
    AmenityDetection, ImageAnalysis, ProcessingType, RoomCondition, RoomConditionAssessment,
    RoomQuality, Sentiment,
};

/// Fallback value returned to the caller when a provider fails
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityFallback {
    /// Apologetic retry request shown in place of a transcription
    Transcript(String),
    /// Neutral acknowledgement in place of an image analysis
    Analysis(ImageAnalysis),
    /// Mid-scale unknown assessment in place of a room-condition read
    Condition(RoomConditionAssessment),
    /// Empty inventory in place of an amenity detection
    Amenities(AmenityDetection),
}

impl CapabilityFallback {
    /// Extract the transcript fallback, if that is what this is
    pub fn into_transcript(self) -> Option<String> {
        match self {
            Self::Transcript(text) => Some(text),
            _ => None,
        }
    }

    /// Extract the image-analysis fallback, if that is what this is
    pub fn into_analysis(self) -> Option<ImageAnalysis> {
        match self {
            Self::Analysis(analysis) => Some(analysis),
            _ => None,
        }
    }

    /// Extract the room-condition fallback, if that is what this is
    pub fn into_condition(self) -> Option<RoomConditionAssessment> {
        match self {
            Self::Condition(assessment) => Some(assessment),
            _ => None,
        }
    }

    /// Extract the amenity fallback, if that is what this is
    pub fn into_amenities(self) -> Option<AmenityDetection> {
        match self {
            Self::Amenities(detection) => Some(detection),
            _ => None,
        }
    }
}

/// Look up the documented fallback for a processing type.
///
/// Returns `None` for [`ProcessingType::TextToSpeech`]: no fallback audio
/// buffer is meaningful, so synthesis failures propagate as errors.
pub fn fallback_for(processing_type: ProcessingType) -> Option<CapabilityFallback> {
    match processing_type {
        ProcessingType::SpeechToText => Some(CapabilityFallback::Transcript(
            "Sorry, we couldn't understand your voice message. Could you please send it \
             as a text message instead?"
                .to_string(),
        )),
        ProcessingType::TextToSpeech => None,
        ProcessingType::ImageAnalysis => Some(CapabilityFallback::Analysis(ImageAnalysis {
            description: "We received your image.".to_string(),
            objects: Vec::new(),
            sentiment: Sentiment::Neutral,
            insights: vec![
                "Please describe what you need in a short text message so we can help."
                    .to_string(),
            ],
            confidence: 0.0,
        })),
        ProcessingType::RoomConditionAnalysis => {
            Some(CapabilityFallback::Condition(RoomConditionAssessment {
                cleanliness: 5,
                condition: RoomCondition::Unknown,
                issues: Vec::new(),
                recommendations: vec![
                    "We couldn't assess the photo automatically. Please contact our staff \
                     directly and we'll take a look right away."
                        .to_string(),
                ],
            }))
        },
        ProcessingType::AmenityDetection => {
            Some(CapabilityFallback::Amenities(AmenityDetection {
                amenities: Vec::new(),
                room_type: "unknown".to_string(),
                quality: RoomQuality::Unknown,
            }))
        },
    }
}
