//! Debug rendering for world bounds and interaction circles using Bevy gizmos.

use bevy::prelude::*;

use crate::interaction::PointerState;
use crate::simulation::characters::{CharacterConfig, Kinematics};
use crate::ui::DebugConfig;
use crate::world::WorldBounds;

const BOUNDS_COLOR: Color = Color::srgb(0.9, 0.8, 0.3);
const HITBOX_COLOR: Color = Color::srgba(0.4, 0.8, 1.0, 0.5);
const HOVER_COLOR: Color = Color::srgb(1.0, 0.55, 0.2);

pub struct DebugRenderPlugin;

impl Plugin for DebugRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (render_world_bounds, render_interaction_radii));
    }
}

/// Outline the walkable rectangle.
fn render_world_bounds(bounds: Res<WorldBounds>, config: Res<DebugConfig>, mut gizmos: Gizmos) {
    if !config.show_radii {
        return;
    }

    let center = Vec2::new(bounds.width * 0.5, -bounds.height * 0.5);
    gizmos.rect_2d(
        Isometry2d::from_translation(center),
        bounds.size(),
        BOUNDS_COLOR,
    );
}

/// Circle every character's hitbox; the hovered one gets its wider
/// interaction circle too.
fn render_interaction_radii(
    config: Res<DebugConfig>,
    character_config: Res<CharacterConfig>,
    pointer: Res<PointerState>,
    characters: Query<(Entity, &Kinematics)>,
    mut gizmos: Gizmos,
) {
    if !config.show_radii {
        return;
    }

    for (entity, kin) in &characters {
        let center = Vec2::new(kin.position.x, -kin.position.y);
        let hovered = pointer.hovered == Some(entity);
        let color = if hovered { HOVER_COLOR } else { HITBOX_COLOR };

        gizmos.circle_2d(
            Isometry2d::from_translation(center),
            character_config.hitbox_radius,
            color,
        );
        if hovered {
            gizmos.circle_2d(
                Isometry2d::from_translation(center),
                character_config.interaction_radius,
                HOVER_COLOR,
            );
        }
    }
}
