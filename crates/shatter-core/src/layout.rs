//! Persisted fragment layouts.
//!
//! A layout is the JSON document that records the rest pose of every
//! fragment of one assembly shape, indexed positionally. The simulation only
//! consumes the decoded list; reading and writing files is the caller's
//! concern.

use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One fragment's rest pose as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// World-space rest position.
    pub position: [f32; 3],
    /// World-space rest rotation quaternion, `[x, y, z, w]`.
    pub rotation: [f32; 4],
}

impl PoseRecord {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position: position.to_array(),
            rotation: rotation.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }
}

/// Ordered rest poses for every fragment of one assembly shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentLayout {
    pub items: Vec<PoseRecord>,
}

impl FragmentLayout {
    /// Parses a layout from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the layout to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
