//! Port for image-analysis capability providers

use async_trait::async_trait;
use domain::{AmenityDetection, ImageAnalysis, RoomConditionAssessment};

use crate::error::ApplicationError;

/// Port for image-analysis providers
///
/// One request/response pair per operation: image URL plus an optional
/// content hint in, structured analysis out.
#[async_trait]
pub trait VisionPort: Send + Sync {
    /// General-purpose analysis of a guest-submitted image
    async fn analyze_image(
        &self,
        image_url: &str,
        content_hint: Option<&str>,
    ) -> Result<ImageAnalysis, ApplicationError>;

    /// Housekeeping assessment of a room photo
    async fn assess_room_condition(
        &self,
        image_url: &str,
    ) -> Result<RoomConditionAssessment, ApplicationError>;

    /// Amenity inventory from a room photo
    async fn detect_amenities(&self, image_url: &str)
    -> Result<AmenityDetection, ApplicationError>;

    /// Check if the provider is reachable
    async fn is_available(&self) -> bool;
}
