//! ECS resources: external command queue, reconstruction scheduler state,
//! magnetic field state, and the layout library.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::layout::FragmentLayout;
use crate::request::{
    ExplosionRequest, MagnetRequest, ReconstructionRequest, ReconstructionStyle,
};

/// Commands that can be pushed into the simulation from outside the ECS.
#[derive(Debug, Clone)]
pub enum SimCommand {
    /// Blow fragments off their assemblies.
    Explode(ExplosionRequest),
    /// Start batched reconstruction of detached fragments.
    Reconstruct(ReconstructionRequest),
    /// Create or retarget the magnetic attraction field.
    Magnetize(MagnetRequest),
    /// Deactivate the magnetic field.
    Demagnetize,
    /// Frame boundary marker - commands after this are processed in the next
    /// frame.
    Yield,
}

/// Thread-safe command queue for driving the simulation from a host
/// application or test harness.
#[derive(Resource, Clone)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<SimCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: SimCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain commands until Yield or empty.
    ///
    /// Returns commands up to (not including) Yield. Yield itself is
    /// consumed but not returned; commands after it stay queued for the
    /// next frame.
    pub fn drain_until_yield(&self) -> Vec<SimCommand> {
        let mut guard = self.inner.lock();
        let mut commands = Vec::new();

        while let Some(cmd) = guard.pop_front() {
            if matches!(cmd, SimCommand::Yield) {
                tracing::debug!("[command] Yield - deferring remaining commands to next frame");
                break;
            }
            commands.push(cmd);
        }

        commands
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one in-flight reconstruction, advanced each fixed tick until all
/// detached fragments have been released.
#[derive(Debug, Clone)]
pub struct ReconstructionProcess {
    /// Reference point for ranking; also the spiral epicenter.
    pub reference_point: Vec3,
    /// Accumulated tick time since the last batch release.
    pub elapsed_since_batch: f32,
    /// Count of fragments released so far, carried across ticks.
    pub released: u32,
    pub batch_size: u32,
    pub batch_delay: f32,
    pub animation_duration: f32,
    pub randomize: bool,
    pub freeze_unprocessed: bool,
    pub style: ReconstructionStyle,
}

impl ReconstructionProcess {
    pub fn from_request(request: &ReconstructionRequest) -> Self {
        Self {
            reference_point: request.reference_point,
            elapsed_since_batch: 0.0,
            released: 0,
            batch_size: request.batch_size,
            batch_delay: request.batch_delay,
            animation_duration: request.animation_duration,
            randomize: request.randomize,
            freeze_unprocessed: request.freeze_unprocessed,
            style: request.style,
        }
    }
}

/// Singleton holder for the active reconstruction. At most one process runs
/// at a time; requests arriving while one is active are discarded.
#[derive(Resource, Debug, Default)]
pub struct ReconstructionScheduler {
    pub process: Option<ReconstructionProcess>,
}

impl ReconstructionScheduler {
    pub fn is_active(&self) -> bool {
        self.process.is_some()
    }
}

/// The magnetic attraction field: a sphere around `position` intersected
/// with a cone along `direction`.
#[derive(Debug, Clone, Copy)]
pub struct MagneticField {
    pub position: Vec3,
    pub direction: Vec3,
    pub radius: f32,
    pub force: f32,
    pub cone_half_angle: f32,
    /// Deactivated fields are kept so displaced fragments still glide home.
    pub active: bool,
}

impl MagneticField {
    pub fn from_request(request: &MagnetRequest) -> Self {
        Self {
            position: request.position,
            direction: request.direction,
            radius: request.radius,
            force: request.force,
            cone_half_angle: request.cone_half_angle,
            active: true,
        }
    }
}

/// Singleton magnetic field state. `None` until the first field is created;
/// while `None`, no magnetic behavior runs at all, including return-to-rest.
#[derive(Resource, Debug, Default)]
pub struct MagnetState {
    pub field: Option<MagneticField>,
}

/// Library of persisted fragment layouts, keyed by assembly shape.
#[derive(Resource, Debug, Default)]
pub struct LayoutLibrary {
    layouts: HashMap<String, FragmentLayout>,
}

impl LayoutLibrary {
    pub fn insert(&mut self, shape: impl Into<String>, layout: FragmentLayout) {
        self.layouts.insert(shape.into(), layout);
    }

    pub fn get(&self, shape: &str) -> Option<&FragmentLayout> {
        self.layouts.get(shape)
    }
}
