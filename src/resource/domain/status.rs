//! Resource lifecycle status and kind.

use super::{ParseResourceKindError, ParseResourceStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a generated resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// The generation executor owns the resource.
    Generating,
    /// An artifact exists and awaits an approver's decision.
    Pending,
    /// An approver accepted the artifact.
    Approved,
    /// An approver rejected the artifact.
    Rejected,
}

impl ResourceStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generating => "generating",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` when moving from `self` to `target` is permitted.
    ///
    /// Removal of a resource that exhausted its attempts without an artifact
    /// is a deletion, not a status, and is not listed here.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Generating, Self::Pending)
                | (Self::Pending, Self::Approved | Self::Rejected)
        )
    }
}

impl TryFrom<&str> for ResourceStatus {
    type Error = ParseResourceStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "generating" => Ok(Self::Generating),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseResourceStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of generated game asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Commander portrait.
    Avatar,
    /// Still image of a planet.
    PlanetImage,
    /// Animated planet video, generated from a planet image.
    PlanetVideo,
}

impl ResourceKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::PlanetImage => "planet_image",
            Self::PlanetVideo => "planet_video",
        }
    }
}

impl TryFrom<&str> for ResourceKind {
    type Error = ParseResourceKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "avatar" => Ok(Self::Avatar),
            "planet_image" => Ok(Self::PlanetImage),
            "planet_video" => Ok(Self::PlanetVideo),
            _ => Err(ParseResourceKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
