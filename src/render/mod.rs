//! Scene presentation: sprite sheets, shadows, and speech bubbles.
//!
//! World coordinates are y-down with the origin at the top-left; Bevy's 2D
//! scene is y-up. Everything that places an entity goes through
//! [`scene_translation`], which flips y and packs a depth into z so that
//! characters lower on screen draw over the ones behind them.

use bevy::prelude::*;

pub mod bubbles;
pub mod shadows;
pub mod sprites;

/// Base z for character sprites.
pub const Z_CHARACTERS: f32 = 1.0;

/// Depth gained per world unit of y. Keeps a full 1200-unit world inside
/// a contiguous z band while leaving room for child offsets.
pub const Y_SORT_FACTOR: f32 = 0.001;

const BACKDROP_COLOR: Color = Color::srgb(0.13, 0.16, 0.19);

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKDROP_COLOR)).add_systems(
            Update,
            (
                sprites::poll_sheet_loads,
                sprites::update_sprite_cells,
                sprites::sync_visibility,
                shadows::attach_shadows,
                bubbles::sync_bubbles,
            ),
        );
    }
}

/// Map a world position to a scene translation: y flips sign and feeds the
/// depth, so greater world y (nearer the bottom edge) draws on top.
pub fn scene_translation(world: Vec2) -> Vec3 {
    Vec3::new(world.x, -world.y, Z_CHARACTERS + world.y * Y_SORT_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_characters_draw_over_higher_ones() {
        let near_top = scene_translation(Vec2::new(300.0, 100.0));
        let near_bottom = scene_translation(Vec2::new(300.0, 1100.0));
        assert!(near_bottom.z > near_top.z);
    }

    #[test]
    fn scene_y_is_negated_world_y() {
        let t = scene_translation(Vec2::new(40.0, 250.0));
        assert_eq!(t.x, 40.0);
        assert_eq!(t.y, -250.0);
    }
}
