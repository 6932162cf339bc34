//! Soft ellipse shadows under each character.

use bevy::prelude::*;

use crate::render::Y_SORT_FACTOR;
use crate::render::sprites::CharacterSheets;
use crate::simulation::characters::CharacterConfig;

const SHADOW_HALF_WIDTH: f32 = 20.0;
const SHADOW_HALF_HEIGHT: f32 = 7.0;
const SHADOW_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.28);

/// Below the owning sprite but above anything more than half a world unit
/// behind it.
const SHADOW_REL_Z: f32 = -0.4 * Y_SORT_FACTOR;

#[derive(Component)]
pub struct CharacterShadow;

/// Give every new character a shadow child at its feet. Visibility is
/// inherited, so shadows appear and vanish with their owner.
pub fn attach_shadows(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<CharacterConfig>,
    newcomers: Query<Entity, Added<CharacterSheets>>,
) {
    for entity in &newcomers {
        commands.entity(entity).with_children(|parent| {
            parent.spawn((
                CharacterShadow,
                Mesh2d(meshes.add(Ellipse::new(SHADOW_HALF_WIDTH, SHADOW_HALF_HEIGHT))),
                MeshMaterial2d(materials.add(ColorMaterial::from(SHADOW_COLOR))),
                Transform::from_xyz(0.0, -config.height * 0.5 + 4.0, SHADOW_REL_Z),
            ));
        });
    }
}
