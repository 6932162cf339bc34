//! Character simulation: wandering, collisions, sitting, and speech.
//!
//! All simulation state lives in world coordinates and advances in baseline
//! ticks: dt = 1.0 is one frame at 60 FPS, scaled by the configured speed
//! and zeroed while paused. The Update chain pins the phase order so speech
//! timers drain first, collision corrections land between movement and
//! animation, and transforms sync last.

use bevy::prelude::*;

pub mod characters;
pub mod collision;
pub mod speech;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationConfig>()
            .init_resource::<TickScale>()
            .init_resource::<characters::CharacterConfig>()
            .init_resource::<crate::roster::RosterConfig>()
            .init_resource::<speech::SpeechConfig>()
            .init_resource::<speech::Responder>()
            .init_resource::<speech::AskLog>()
            .add_event::<characters::ToggleSit>()
            .add_event::<speech::AskQuestion>()
            .add_event::<speech::Say>()
            .add_event::<speech::ToggleBubble>()
            .add_systems(Startup, characters::spawn_characters)
            .add_systems(
                Update,
                (
                    update_tick_scale,
                    characters::apply_sit_toggles,
                    speech::apply_questions,
                    speech::apply_spoken_lines,
                    speech::apply_bubble_toggles,
                    speech::tick_speech,
                    characters::wander_movement,
                    collision::resolve_collisions,
                    characters::update_animation,
                    characters::sync_transforms,
                )
                    .chain(),
            )
            .add_systems(Update, simulation_controls);
    }
}

/// Pause state and speed multiplier for the whole simulation.
#[derive(Resource)]
pub struct SimulationConfig {
    /// Speed multiplier applied to the baseline tick.
    pub speed: f32,
    /// Whether simulation is paused.
    pub paused: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            paused: false,
        }
    }
}

/// Frames per second the tick units are calibrated against.
pub const BASE_TICK_RATE: f32 = 60.0;

/// Baseline ticks elapsed this frame: 1.0 at 60 FPS and 1x speed, 0 while
/// paused. Every dt-scaled system reads this instead of wall-clock time.
#[derive(Resource, Default)]
pub struct TickScale(pub f32);

fn scaled_ticks(delta_secs: f32, config: &SimulationConfig) -> f32 {
    if config.paused {
        0.0
    } else {
        delta_secs * BASE_TICK_RATE * config.speed
    }
}

fn update_tick_scale(
    time: Res<Time>,
    config: Res<SimulationConfig>,
    mut tick: ResMut<TickScale>,
) {
    tick.0 = scaled_ticks(time.delta_secs(), &config);
}

/// Keyboard controls for simulation speed and pause.
fn simulation_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut config: ResMut<SimulationConfig>,
) {
    // Space: Toggle pause
    if keyboard.just_pressed(KeyCode::Space) {
        config.paused = !config.paused;
        if config.paused {
            info!("Simulation PAUSED");
        } else {
            info!("Simulation RESUMED ({}x speed)", config.speed);
        }
    }

    // Number keys for speed presets
    if keyboard.just_pressed(KeyCode::Digit1) {
        config.speed = 1.0;
        info!("Simulation speed: 1x");
    }
    if keyboard.just_pressed(KeyCode::Digit2) {
        config.speed = 2.0;
        info!("Simulation speed: 2x");
    }
    if keyboard.just_pressed(KeyCode::Digit3) {
        config.speed = 3.0;
        info!("Simulation speed: 3x");
    }
    if keyboard.just_pressed(KeyCode::Digit4) {
        config.speed = 4.0;
        info!("Simulation speed: 4x");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_scale_is_one_at_sixty_fps() {
        let config = SimulationConfig::default();
        assert!((scaled_ticks(1.0 / 60.0, &config) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tick_scale_tracks_speed_and_pause() {
        let mut config = SimulationConfig {
            speed: 2.0,
            paused: false,
        };
        assert!((scaled_ticks(1.0 / 60.0, &config) - 2.0).abs() < 1e-6);
        config.paused = true;
        assert_eq!(scaled_ticks(1.0 / 60.0, &config), 0.0);
    }
}
