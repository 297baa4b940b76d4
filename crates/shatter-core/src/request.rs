//! Validated one-shot request payloads.
//!
//! Requests are rejected at construction, never partially applied: a
//! malformed request is a configuration error at the boundary, and the
//! simulation systems only ever see well-formed values.

use bevy::math::Vec3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("batch size must be greater than zero")]
    NonPositiveBatchSize,
    #[error("animation duration must be greater than zero")]
    NonPositiveDuration,
    #[error("batch delay must not be negative")]
    NegativeDelay,
    #[error("radius must be greater than zero")]
    NonPositiveRadius,
    #[error("field direction must be a non-zero vector")]
    ZeroDirection,
}

/// Reconstruction animation choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconstructionStyle {
    /// Straight interpolation from the scattered pose to the rest pose.
    #[default]
    Default,
    /// Helical flourish around the epicenter, then a straight move home.
    Spiral,
}

/// Request to reconstruct all detached fragments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructionRequest {
    /// Reference point for distance ranking; also the spiral epicenter.
    pub reference_point: Vec3,
    /// Release batches in natural query order instead of by rank.
    pub randomize: bool,
    /// Strip physics from fragments left out of each batch, freezing them.
    pub freeze_unprocessed: bool,
    /// Fragments released per batch.
    pub batch_size: u32,
    /// Seconds of accumulated tick time between batch releases.
    pub batch_delay: f32,
    /// Seconds each fragment's homing animation runs.
    pub animation_duration: f32,
    pub style: ReconstructionStyle,
}

impl ReconstructionRequest {
    pub fn new(
        reference_point: Vec3,
        batch_size: u32,
        batch_delay: f32,
        animation_duration: f32,
        style: ReconstructionStyle,
    ) -> Result<Self, RequestError> {
        if batch_size == 0 {
            return Err(RequestError::NonPositiveBatchSize);
        }
        if animation_duration <= 0.0 {
            return Err(RequestError::NonPositiveDuration);
        }
        if batch_delay < 0.0 {
            return Err(RequestError::NegativeDelay);
        }
        Ok(Self {
            reference_point,
            randomize: false,
            freeze_unprocessed: false,
            batch_size,
            batch_delay,
            animation_duration,
            style,
        })
    }

    pub fn with_randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    pub fn with_freeze_unprocessed(mut self, freeze: bool) -> Self {
        self.freeze_unprocessed = freeze;
        self
    }
}

/// Request to scatter fragments outward from an epicenter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionRequest {
    pub epicenter: Vec3,
    pub radius: f32,
    pub force: f32,
    /// Angular velocity imparted along each fragment's outward direction.
    pub rotation_amount: f32,
}

impl ExplosionRequest {
    pub fn new(
        epicenter: Vec3,
        radius: f32,
        force: f32,
        rotation_amount: f32,
    ) -> Result<Self, RequestError> {
        if radius <= 0.0 {
            return Err(RequestError::NonPositiveRadius);
        }
        Ok(Self {
            epicenter,
            radius,
            force,
            rotation_amount,
        })
    }
}

/// Request to create or retarget the magnetic attraction field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetRequest {
    pub position: Vec3,
    /// Cone axis; normalized at construction.
    pub direction: Vec3,
    pub radius: f32,
    pub force: f32,
    /// Half-angle of the influence cone, radians.
    pub cone_half_angle: f32,
}

impl MagnetRequest {
    pub fn new(
        position: Vec3,
        direction: Vec3,
        radius: f32,
        force: f32,
        cone_half_angle: f32,
    ) -> Result<Self, RequestError> {
        if radius <= 0.0 {
            return Err(RequestError::NonPositiveRadius);
        }
        let direction = direction
            .try_normalize()
            .ok_or(RequestError::ZeroDirection)?;
        Ok(Self {
            position,
            direction,
            radius,
            force,
            cone_half_angle,
        })
    }
}
