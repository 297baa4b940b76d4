//! Simulation systems.

pub mod animation;
pub mod command;
pub mod explosion;
pub mod magnetism;
pub mod reconstruction;

pub use animation::{drive_glide_animations, drive_spiral_animations};
pub use command::process_commands;
pub use explosion::handle_explosion_requests;
pub use magnetism::{apply_magnetic_forces, handle_magnet_requests};
pub use reconstruction::{handle_reconstruction_requests, run_reconstruction_batches};
