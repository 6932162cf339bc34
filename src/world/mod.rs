//! World bounds, ground plane, and the background grid.

use bevy::prelude::*;

use crate::ui::DebugConfig;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldBounds>()
            .add_systems(Startup, setup_ground)
            .add_systems(Update, sync_grid_visibility);
    }
}

/// Rectangle the characters roam, in world units.
///
/// World coordinates put the origin at the top-left corner with y growing
/// downward; the scene maps world (x, y) onto render (x, -y).
#[derive(Resource)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
        }
    }
}

impl WorldBounds {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }
}

const GROUND_COLOR: Color = Color::srgb(0.42, 0.54, 0.38);
const GRID_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.08);
const GRID_STEP: f32 = 100.0;
/// Between the ground (0.0) and the characters (1.0 and up).
const GRID_Z: f32 = 0.5;

/// Marker for grid line sprites so the G toggle can hide them.
#[derive(Component)]
struct GridLine;

fn setup_ground(mut commands: Commands, bounds: Res<WorldBounds>) {
    commands.spawn((
        Sprite::from_color(GROUND_COLOR, bounds.size()),
        Transform::from_xyz(bounds.width * 0.5, -bounds.height * 0.5, 0.0),
    ));

    // Grid lines are plain 1px sprites so they sit under the characters
    // instead of overlaying them the way gizmos would.
    let mut x = 0.0;
    while x <= bounds.width {
        commands.spawn((
            Sprite::from_color(GRID_COLOR, Vec2::new(1.0, bounds.height)),
            Transform::from_xyz(x, -bounds.height * 0.5, GRID_Z),
            GridLine,
        ));
        x += GRID_STEP;
    }
    let mut y = 0.0;
    while y <= bounds.height {
        commands.spawn((
            Sprite::from_color(GRID_COLOR, Vec2::new(bounds.width, 1.0)),
            Transform::from_xyz(bounds.width * 0.5, -y, GRID_Z),
            GridLine,
        ));
        y += GRID_STEP;
    }

    info!(
        "World ready: {}x{} units, grid every {} units",
        bounds.width, bounds.height, GRID_STEP
    );
}

fn sync_grid_visibility(
    config: Res<DebugConfig>,
    mut lines: Query<&mut Visibility, With<GridLine>>,
) {
    if !config.is_changed() {
        return;
    }
    let target = if config.show_grid {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut lines {
        *visibility = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_midpoint_of_bounds() {
        let bounds = WorldBounds::default();
        assert_eq!(bounds.center(), Vec2::new(800.0, 600.0));
    }
}
