//! Command processing system.
//!
//! Translates commands from the external queue into ECS messages.

use bevy::prelude::*;

use crate::bevy::events::{
    ExplosionRequestEvent, MagnetOffEvent, MagnetRequestEvent, ReconstructionRequestEvent,
};
use crate::bevy::resources::{CommandQueue, SimCommand};

/// System to process all commands from the external command queue.
///
/// Handles commands until a Yield is encountered; commands after Yield are
/// processed in the next frame.
pub fn process_commands(
    command_queue: Res<CommandQueue>,
    mut explosion_events: MessageWriter<ExplosionRequestEvent>,
    mut reconstruction_events: MessageWriter<ReconstructionRequestEvent>,
    mut magnet_events: MessageWriter<MagnetRequestEvent>,
    mut magnet_off_events: MessageWriter<MagnetOffEvent>,
) {
    for command in command_queue.drain_until_yield() {
        match command {
            SimCommand::Explode(request) => {
                tracing::info!("[command] Explode at {:?}", request.epicenter);
                explosion_events.write(ExplosionRequestEvent(request));
            }
            SimCommand::Reconstruct(request) => {
                tracing::info!(
                    "[command] Reconstruct ({:?}, batch={})",
                    request.style,
                    request.batch_size
                );
                reconstruction_events.write(ReconstructionRequestEvent(request));
            }
            SimCommand::Magnetize(request) => {
                tracing::info!("[command] Magnetize at {:?}", request.position);
                magnet_events.write(MagnetRequestEvent(request));
            }
            SimCommand::Demagnetize => {
                tracing::info!("[command] Demagnetize");
                magnet_off_events.write(MagnetOffEvent);
            }
            // Yield is consumed by drain_until_yield(), should not reach here
            SimCommand::Yield => {}
        }
    }
}
