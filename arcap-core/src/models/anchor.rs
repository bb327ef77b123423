use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::traits::texture_device::CubemapTexture;

/// What happened to an anchor in the scene.
///
/// The wire code (`0`/`1`/`2`) is what lands in the JSON records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEventStatus {
    Added,
    Removed,
    Updated,
}

impl AnchorEventStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Added => 0,
            Self::Removed => 1,
            Self::Updated => 2,
        }
    }
}

/// A scene anchor reported by the capture source.
///
/// `kind` is a closed variant: the coordinator dispatches on it
/// exhaustively, probe before plane before generic.
#[derive(Debug, Clone)]
pub struct Anchor {
    /// Opaque stable identifier, unchanged across update events.
    pub identifier: Uuid,
    /// Producer-assigned name; empty when unnamed.
    pub name: String,
    /// World transform, flattened row-major.
    pub transform: [f32; 16],
    pub kind: AnchorKind,
}

#[derive(Debug, Clone)]
pub enum AnchorKind {
    Plane(PlaneAnchorData),
    EnvironmentProbe(EnvironmentProbeData),
    Generic,
}

/// Orientation of a detected plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneAlignment {
    Horizontal,
    Vertical,
}

impl PlaneAlignment {
    pub fn code(&self) -> u8 {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }
}

/// Semantic classification of a detected plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneClassification {
    Unknown,
    Wall,
    Floor,
    Ceiling,
    Table,
    Seat,
    Window,
    Door,
}

impl PlaneClassification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Wall => "wall",
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
            Self::Table => "table",
            Self::Seat => "seat",
            Self::Window => "window",
            Self::Door => "door",
        }
    }
}

/// Payload of a detected-plane anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneAnchorData {
    pub center: [f32; 3],
    pub extent: [f32; 3],
    pub alignment: PlaneAlignment,
    pub classification: PlaneClassification,
}

/// Payload of an environment-probe anchor.
///
/// `texture` is the probe's live cubemap on the capture device. It may be
/// overwritten by the producer as soon as the event handler returns, so
/// the ring writer copies it out before returning control.
#[derive(Clone)]
pub struct EnvironmentProbeData {
    pub extent: [f32; 3],
    pub texture: Option<Arc<dyn CubemapTexture>>,
}

impl fmt::Debug for EnvironmentProbeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentProbeData")
            .field("extent", &self.extent)
            .field("texture", &self.texture.is_some())
            .finish()
    }
}
