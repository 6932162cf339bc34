//! Character entities: spawning, wandering, sitting, facing, and animation.
//!
//! Each roster record becomes one entity that wanders the world bounds,
//! bounces off the edges, occasionally picks a new heading, and advances a
//! shared nine-frame walk cycle. Sitting freezes the velocity behind a
//! snapshot that the stand-up toggle restores exactly.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::render::scene_translation;
use crate::render::sprites::{CharacterSheets, SheetSlot, SHEET_ROWS, SIT_COLUMNS, WALK_COLUMNS};
use crate::roster::{self, RosterConfig};
use crate::simulation::speech::Speech;
use crate::simulation::TickScale;
use crate::world::WorldBounds;

/// Seed for the wander redirect rolls, separate from placement.
const WANDER_SEED: u64 = 24601;

/// Tunables shared by every simulated character.
#[derive(Resource)]
pub struct CharacterConfig {
    /// Drawn sprite width in world units.
    pub width: f32,
    /// Drawn sprite height in world units.
    pub height: f32,
    /// Walking speed in world units per baseline tick.
    pub speed: f32,
    /// Chance per baseline tick of picking a fresh heading.
    pub direction_change_prob: f32,
    /// Frame-accumulator gain per baseline tick.
    pub animation_speed: f32,
    /// Collision circle radius; the resolver aims for two of these.
    pub hitbox_radius: f32,
    /// Hover and click radius, a little wider than the hitbox.
    pub interaction_radius: f32,
    /// Frames per facing row of the walk sheet.
    pub walk_frames: usize,
    /// Seed for initial placement and headings.
    pub seed: u64,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 64.0,
            speed: 1.2,
            direction_change_prob: 0.01,
            animation_speed: 0.15,
            hitbox_radius: 20.0,
            interaction_radius: 40.0,
            walk_frames: 9,
            seed: 77777,
        }
    }
}

/// Stable id from the roster record.
#[derive(Component, Clone, Debug)]
pub struct CharacterId(pub String);

/// Position in the roster, fixing the deterministic processing order.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RosterIndex(pub usize);

/// The roster description, shown in the HUD and handed to the responder.
#[derive(Component, Clone, Debug)]
pub struct Persona {
    pub description: String,
}

/// Position and velocity in world units (per baseline tick).
#[derive(Component, Clone, Copy, Debug)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Which way the character faces, in walk sheet row order.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Up,
    Left,
    Down,
    Right,
}

impl Facing {
    /// Row of this facing in the walk sheet.
    pub fn sheet_row(self) -> usize {
        match self {
            Facing::Up => 0,
            Facing::Left => 1,
            Facing::Down => 2,
            Facing::Right => 3,
        }
    }
}

/// Walk-cycle progress. The frame index is shared across facings; changing
/// direction keeps the cycle phase.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct AnimationState {
    pub frame: usize,
    pub accum: f32,
}

/// Lifecycle state. The velocity snapshot exists exactly while sitting.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub enum CharacterState {
    Wandering,
    Sitting { saved_velocity: Vec2 },
    Talking,
}

/// Request to sit a wandering character down, or stand a sitting one up.
#[derive(Event)]
pub struct ToggleSit {
    pub target: Entity,
}

pub fn spawn_characters(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    bounds: Res<WorldBounds>,
    config: Res<CharacterConfig>,
    roster_config: Res<RosterConfig>,
) {
    let records = if roster_config.manifest_path.exists() {
        match roster::load_manifest(&roster_config.manifest_path) {
            Ok(records) => {
                info!(
                    "Loaded {} characters from {}",
                    records.len(),
                    roster_config.manifest_path.display()
                );
                records
            }
            Err(err) => {
                warn!("{err}; falling back to a generated roster");
                roster::generate(roster_config.generated_count, roster_config.seed)
            }
        }
    } else {
        info!(
            "No roster manifest at {}; generating {} characters",
            roster_config.manifest_path.display(),
            roster_config.generated_count
        );
        roster::generate(roster_config.generated_count, roster_config.seed)
    };

    let mut rng = StdRng::seed_from_u64(config.seed);
    let count = records.len();

    for (index, record) in records.into_iter().enumerate() {
        let position = Vec2::new(
            rng.gen_range(0.0..bounds.width),
            rng.gen_range(0.0..bounds.height),
        );
        let heading = rng.gen_range(0.0..TAU);
        let velocity = Vec2::from_angle(heading) * config.speed;

        let walk = SheetSlot::load(&asset_server, &record.walk_sheet, WALK_COLUMNS, SHEET_ROWS);
        let sit = SheetSlot::load(&asset_server, &record.sit_sheet, SIT_COLUMNS, SHEET_ROWS);
        let body = Sprite {
            image: walk.image.clone(),
            custom_size: Some(Vec2::new(config.width, config.height)),
            ..default()
        };

        commands.spawn((
            CharacterId(record.id),
            RosterIndex(index),
            Persona {
                description: record.description,
            },
            Kinematics { position, velocity },
            Facing::Down,
            AnimationState::default(),
            CharacterState::Wandering,
            Speech::default(),
            CharacterSheets { walk, sit },
            body,
            Transform::from_translation(scene_translation(position)),
            // Hidden until the walk sheet is usable.
            Visibility::Hidden,
        ));
    }

    info!("Spawned {count} characters");
}

/// Integrate one step and reflect off the four world edges independently.
fn integrate_and_bounce(kin: &mut Kinematics, bounds: &WorldBounds, dt: f32) {
    let step = kin.velocity * dt;
    kin.position += step;

    if kin.position.x < 0.0 {
        kin.position.x = 0.0;
        kin.velocity.x = -kin.velocity.x;
    } else if kin.position.x > bounds.width {
        kin.position.x = bounds.width;
        kin.velocity.x = -kin.velocity.x;
    }
    if kin.position.y < 0.0 {
        kin.position.y = 0.0;
        kin.velocity.y = -kin.velocity.y;
    } else if kin.position.y > bounds.height {
        kin.position.y = bounds.height;
        kin.velocity.y = -kin.velocity.y;
    }
}

/// Move every non-sitting character and roll for heading changes.
pub fn wander_movement(
    tick: Res<TickScale>,
    bounds: Res<WorldBounds>,
    config: Res<CharacterConfig>,
    mut characters: Query<(&mut Kinematics, &CharacterState)>,
    mut local_rng: Local<Option<StdRng>>,
) {
    let dt = tick.0;
    if dt == 0.0 {
        return;
    }
    let rng = local_rng.get_or_insert_with(|| StdRng::seed_from_u64(WANDER_SEED));

    for (mut kin, state) in &mut characters {
        if matches!(state, CharacterState::Sitting { .. }) {
            continue;
        }

        integrate_and_bounce(&mut kin, &bounds, dt);

        let redirect_chance = (config.direction_change_prob * dt).clamp(0.0, 1.0);
        if rng.gen_bool(redirect_chance as f64) {
            let heading = rng.gen_range(0.0..TAU);
            kin.velocity = Vec2::from_angle(heading) * config.speed;
        }
    }
}

/// Facing from velocity: horizontal wins only on a strict majority, vertical
/// on any remaining motion, and zero velocity keeps the current facing.
fn facing_from_velocity(v: Vec2) -> Option<Facing> {
    if v.x.abs() > v.y.abs() {
        Some(if v.x > 0.0 { Facing::Right } else { Facing::Left })
    } else if v.y.abs() > 0.0 {
        // World y grows downward.
        Some(if v.y > 0.0 { Facing::Down } else { Facing::Up })
    } else {
        None
    }
}

fn advance_animation(anim: &mut AnimationState, gain: f32, frames: usize) {
    anim.accum += gain;
    if anim.accum >= 1.0 {
        anim.accum = 0.0;
        anim.frame = (anim.frame + 1) % frames;
    }
}

/// Update facing and the walk-cycle frame for every character, sitting or not.
pub fn update_animation(
    tick: Res<TickScale>,
    config: Res<CharacterConfig>,
    mut characters: Query<(&Kinematics, &mut Facing, &mut AnimationState)>,
) {
    let dt = tick.0;
    if dt == 0.0 {
        return;
    }

    for (kin, mut facing, mut anim) in &mut characters {
        if let Some(next) = facing_from_velocity(kin.velocity) {
            if *facing != next {
                *facing = next;
            }
        }
        advance_animation(&mut anim, config.animation_speed * dt, config.walk_frames);
    }
}

fn apply_sit_toggle(kin: &mut Kinematics, state: &mut CharacterState) {
    *state = match *state {
        CharacterState::Sitting { saved_velocity } => {
            kin.velocity = saved_velocity;
            CharacterState::Wandering
        }
        CharacterState::Wandering => {
            let saved_velocity = kin.velocity;
            kin.velocity = Vec2::ZERO;
            CharacterState::Sitting { saved_velocity }
        }
        // Only the Wandering <-> Sitting edges exist; a talking character
        // keeps talking.
        CharacterState::Talking => CharacterState::Talking,
    };
}

pub fn apply_sit_toggles(
    mut events: EventReader<ToggleSit>,
    mut characters: Query<(&mut Kinematics, &mut CharacterState)>,
) {
    for event in events.read() {
        let Ok((mut kin, mut state)) = characters.get_mut(event.target) else {
            continue;
        };
        apply_sit_toggle(&mut kin, &mut state);
    }
}

/// Project world positions into the scene, lower characters drawing on top.
pub fn sync_transforms(mut characters: Query<(&Kinematics, &mut Transform), With<CharacterId>>) {
    for (kin, mut transform) in &mut characters {
        transform.translation = scene_translation(kin.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds {
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn bounce_reflects_velocity_and_clamps_position() {
        let mut kin = Kinematics {
            position: Vec2::new(798.0, 10.0),
            velocity: Vec2::new(5.0, -20.0),
        };
        integrate_and_bounce(&mut kin, &bounds(), 1.0);
        assert_eq!(kin.position, Vec2::new(800.0, 0.0));
        assert_eq!(kin.velocity, Vec2::new(-5.0, 20.0));
    }

    #[test]
    fn positions_stay_inside_bounds_over_many_steps() {
        let bounds = bounds();
        let mut kin = Kinematics {
            position: Vec2::new(400.0, 300.0),
            velocity: Vec2::new(17.3, -11.9),
        };
        for _ in 0..1000 {
            integrate_and_bounce(&mut kin, &bounds, 1.0);
            assert!(kin.position.x >= 0.0 && kin.position.x <= bounds.width);
            assert!(kin.position.y >= 0.0 && kin.position.y <= bounds.height);
        }
    }

    #[test]
    fn sit_toggle_round_trips_velocity_exactly() {
        let mut kin = Kinematics {
            position: Vec2::new(100.0, 100.0),
            velocity: Vec2::new(1.2, -0.7),
        };
        let mut state = CharacterState::Wandering;

        apply_sit_toggle(&mut kin, &mut state);
        assert_eq!(kin.velocity, Vec2::ZERO);
        assert_eq!(
            state,
            CharacterState::Sitting {
                saved_velocity: Vec2::new(1.2, -0.7)
            }
        );

        apply_sit_toggle(&mut kin, &mut state);
        assert_eq!(kin.velocity, Vec2::new(1.2, -0.7));
        assert_eq!(state, CharacterState::Wandering);
    }

    #[test]
    fn sit_toggle_is_ignored_while_talking() {
        let mut kin = Kinematics {
            position: Vec2::ZERO,
            velocity: Vec2::new(0.5, 0.5),
        };
        let mut state = CharacterState::Talking;
        apply_sit_toggle(&mut kin, &mut state);
        assert_eq!(state, CharacterState::Talking);
        assert_eq!(kin.velocity, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn facing_prefers_strict_horizontal_majority() {
        assert_eq!(
            facing_from_velocity(Vec2::new(3.0, -1.0)),
            Some(Facing::Right)
        );
        assert_eq!(
            facing_from_velocity(Vec2::new(-1.0, 3.0)),
            Some(Facing::Down)
        );
        // A tie goes to the vertical axis.
        assert_eq!(facing_from_velocity(Vec2::new(2.0, -2.0)), Some(Facing::Up));
        assert_eq!(facing_from_velocity(Vec2::ZERO), None);
    }

    #[test]
    fn animation_frame_wraps_after_full_cycle() {
        let mut anim = AnimationState::default();
        // Gain 0.5 per step: every second step advances the frame.
        for _ in 0..18 {
            advance_animation(&mut anim, 0.5, 9);
        }
        assert_eq!(anim.frame, 0);
        advance_animation(&mut anim, 1.0, 9);
        assert_eq!(anim.frame, 1);
        assert_eq!(anim.accum, 0.0);
    }
}
