//! ECS Events (Messages) for the fragment simulation.
//!
//! Note: In Bevy 0.18+, buffered events use the Message trait instead of
//! Event.

use bevy::prelude::*;

use crate::request::{ExplosionRequest, MagnetRequest, ReconstructionRequest};

/// Message to scatter fragments outward from an epicenter.
#[derive(Message, Debug, Clone)]
pub struct ExplosionRequestEvent(pub ExplosionRequest);

/// Message to start batched reconstruction of all detached fragments.
#[derive(Message, Debug, Clone)]
pub struct ReconstructionRequestEvent(pub ReconstructionRequest);

/// Message to create or retarget the magnetic attraction field.
#[derive(Message, Debug, Clone)]
pub struct MagnetRequestEvent(pub MagnetRequest);

/// Message to deactivate the magnetic field, sending captured fragments home.
#[derive(Message, Debug, Clone, Default)]
pub struct MagnetOffEvent;
