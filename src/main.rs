//! Agora - a crowd of animated sprite characters wandering a shared plaza.

use bevy::prelude::*;

use agora::{camera, interaction, render, simulation, ui, world};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Agora".into(),
                        resolution: (1280., 720.).into(),
                        ..default()
                    }),
                    ..default()
                })
                // The character sheets are pixel art; linear filtering smears them.
                .set(ImagePlugin::default_nearest()),
        )
        // World bounds and ground
        .add_plugins(world::WorldPlugin)
        // Camera
        .add_plugins(camera::CameraPlugin)
        // Scene composition: sheets, shadows, bubbles
        .add_plugins(render::RenderPlugin)
        // Simulation
        .add_plugins(simulation::SimulationPlugin)
        // Pointer and keyboard input
        .add_plugins(interaction::InteractionPlugin)
        // HUD and debug overlays
        .add_plugins(ui::UiPlugin)
        .run();
}
