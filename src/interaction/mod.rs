//! Pointer and keyboard interaction.
//!
//! The left button does double duty: a release within a few pixels of the
//! press is a click (toggle the bubble under the cursor), anything farther
//! drags the camera. Click-vs-drag goes by the straight-line down-to-up
//! distance, so a pan that wanders out and settles back where it started
//! still lands as a click; the pan itself engages on cursor excursion, so
//! such a round trip pans the camera on the way.

use bevy::prelude::*;

use crate::camera::{screen_to_world, WorldCamera};
use crate::simulation::characters::{CharacterConfig, Kinematics, RosterIndex, ToggleSit};
use crate::simulation::speech::{AskQuestion, ToggleBubble};

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .init_resource::<QuestionDeck>()
            .add_systems(
                Update,
                (update_hover, pointer_pan_and_click, keyboard_shortcuts).chain(),
            );
    }
}

/// Maximum cursor travel for a press to still count as a click.
const CLICK_SLOP_PX: f32 = 5.0;

const CANNED_QUESTIONS: &[&str] = &[
    "Should I go to the hackathon this weekend?",
    "Is this a good spot to sit down?",
    "Do you like it here in the plaza?",
    "Should I learn another programming language?",
];

/// What the pointer is over, plus the live press for click-vs-pan.
#[derive(Resource, Default)]
pub struct PointerState {
    pub hovered: Option<Entity>,
    pub world_pos: Option<Vec2>,
    press: Option<Press>,
}

struct Press {
    screen: Vec2,
    camera_offset: Vec2,
    /// Greatest cursor excursion since the press, in screen pixels.
    travel: f32,
}

impl Press {
    /// Fold the cursor's current excursion into `travel`; once the press has
    /// strayed past the slop, return the camera offset that keeps the pressed
    /// world point under the cursor. Screen and world y both point down, so
    /// the pan needs no axis flip.
    fn track(&mut self, cursor: Vec2, zoom: f32) -> Option<Vec2> {
        let delta = cursor - self.screen;
        self.travel = self.travel.max(delta.length());
        if self.travel > CLICK_SLOP_PX {
            Some(self.camera_offset - delta / zoom)
        } else {
            None
        }
    }

    /// Click-vs-drag is decided at release by the straight-line distance
    /// from the press point, not by where the cursor went in between.
    fn is_click(&self, release: Vec2) -> bool {
        (release - self.screen).length() <= CLICK_SLOP_PX
    }
}

/// Questions handed out by the ask shortcuts, in rotation.
#[derive(Resource, Default)]
pub struct QuestionDeck {
    next: usize,
}

impl QuestionDeck {
    pub fn draw(&mut self) -> &'static str {
        let question = CANNED_QUESTIONS[self.next % CANNED_QUESTIONS.len()];
        self.next = (self.next + 1) % CANNED_QUESTIONS.len();
        question
    }
}

/// First candidate within `radius` of `cursor`, in iteration order.
fn first_within<T: Copy>(
    cursor: Vec2,
    radius: f32,
    mut candidates: impl Iterator<Item = (T, Vec2)>,
) -> Option<T> {
    candidates
        .find(|(_, pos)| pos.distance(cursor) <= radius)
        .map(|(item, _)| item)
}

/// Nearest candidate within `radius` of `cursor`; iteration order breaks
/// exact ties.
fn closest_within<T: Copy>(
    cursor: Vec2,
    radius: f32,
    candidates: impl Iterator<Item = (T, Vec2)>,
) -> Option<T> {
    candidates
        .filter(|(_, pos)| pos.distance(cursor) <= radius)
        .min_by(|(_, a), (_, b)| {
            a.distance_squared(cursor)
                .partial_cmp(&b.distance_squared(cursor))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(item, _)| item)
}

/// Characters in roster order with their world positions.
fn hit_candidates(
    characters: &Query<(Entity, &RosterIndex, &Kinematics)>,
) -> Vec<(Entity, Vec2)> {
    let mut candidates: Vec<(usize, Entity, Vec2)> = characters
        .iter()
        .map(|(entity, index, kin)| (index.0, entity, kin.position))
        .collect();
    candidates.sort_unstable_by_key(|(index, _, _)| *index);
    candidates
        .into_iter()
        .map(|(_, entity, pos)| (entity, pos))
        .collect()
}

fn update_hover(
    windows: Query<&Window>,
    cameras: Query<&WorldCamera>,
    characters: Query<(Entity, &RosterIndex, &Kinematics)>,
    config: Res<CharacterConfig>,
    mut pointer: ResMut<PointerState>,
) {
    // A despawned character must not linger as the hover target.
    if pointer.hovered.is_some_and(|e| characters.get(e).is_err()) {
        pointer.hovered = None;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok(camera) = cameras.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        pointer.world_pos = None;
        pointer.hovered = None;
        return;
    };

    let viewport = Vec2::new(window.width(), window.height());
    let world = screen_to_world(cursor, viewport, camera.offset, camera.zoom);
    pointer.world_pos = Some(world);
    pointer.hovered = first_within(
        world,
        config.interaction_radius,
        hit_candidates(&characters).into_iter(),
    );
}

fn pointer_pan_and_click(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut cameras: Query<&mut WorldCamera>,
    characters: Query<(Entity, &RosterIndex, &Kinematics)>,
    config: Res<CharacterConfig>,
    mut pointer: ResMut<PointerState>,
    mut bubble_toggles: EventWriter<ToggleBubble>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok(mut camera) = cameras.get_single_mut() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Left) {
        if let Some(cursor) = window.cursor_position() {
            pointer.press = Some(Press {
                screen: cursor,
                camera_offset: camera.offset,
                travel: 0.0,
            });
        }
    }

    if buttons.pressed(MouseButton::Left) {
        if let (Some(press), Some(cursor)) = (pointer.press.as_mut(), window.cursor_position()) {
            if let Some(offset) = press.track(cursor, camera.zoom) {
                camera.offset = offset;
            }
        }
    }

    if buttons.just_released(MouseButton::Left) {
        let Some(press) = pointer.press.take() else {
            return;
        };
        let cursor = window.cursor_position().unwrap_or(press.screen);
        if !press.is_click(cursor) {
            return;
        }

        let viewport = Vec2::new(window.width(), window.height());
        let world = screen_to_world(cursor, viewport, camera.offset, camera.zoom);
        if let Some(target) = closest_within(
            world,
            config.interaction_radius,
            hit_candidates(&characters).into_iter(),
        ) {
            bubble_toggles.send(ToggleBubble { target });
        }
    }
}

fn keyboard_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    pointer: Res<PointerState>,
    mut deck: ResMut<QuestionDeck>,
    characters: Query<(Entity, &RosterIndex, &Kinematics)>,
    mut questions: EventWriter<AskQuestion>,
    mut sit_toggles: EventWriter<ToggleSit>,
) {
    if keys.just_pressed(KeyCode::KeyQ) {
        if let Some(target) = pointer.hovered {
            let question = deck.draw().to_owned();
            info!("Asked the hovered character: {question}");
            questions.send(AskQuestion { target, question });
        }
    }

    if keys.just_pressed(KeyCode::KeyE) {
        let candidates = hit_candidates(&characters);
        let count = candidates.len();
        let question = deck.draw().to_owned();
        for (target, _) in candidates {
            questions.send(AskQuestion {
                target,
                question: question.clone(),
            });
        }
        info!("Asked {count} characters: {question}");
    }

    if keys.just_pressed(KeyCode::KeyX) {
        if let Some(target) = pointer.hovered {
            sit_toggles.send(ToggleSit { target });
        }
    }
}
