//! 2D world camera with wheel zoom, keyboard pan, and the screen/world
//! coordinate mapping.
//!
//! The camera state lives in world coordinates: `offset` is the world point
//! shown at the viewport center and `zoom` the world-to-screen magnification.
//! A sync system projects that state onto the Bevy camera every frame, so
//! everything else (pointer pan in `interaction`, hit tests) only ever deals
//! with [`WorldCamera`] and the pure mapping functions below.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use crate::world::WorldBounds;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera).add_systems(
            Update,
            (camera_zoom, camera_keyboard_pan, camera_transform_sync).chain(),
        );
    }
}

pub const ZOOM_MIN: f32 = 0.2;
pub const ZOOM_MAX: f32 = 6.0;
/// Zoom change per wheel notch.
const ZOOM_STEP: f32 = 0.1;
/// Keyboard pan speed in screen pixels per second.
const PAN_SPEED: f32 = 400.0;

/// The world camera.
#[derive(Component)]
pub struct WorldCamera {
    /// World point at the viewport center.
    pub offset: Vec2,
    /// Magnification: screen pixels per world unit.
    pub zoom: f32,
}

/// Map a window cursor position (origin top-left, y down) to world
/// coordinates. World y also grows downward, so no axis flip is involved.
pub fn screen_to_world(screen: Vec2, viewport: Vec2, offset: Vec2, zoom: f32) -> Vec2 {
    (screen - viewport * 0.5) / zoom + offset
}

/// Inverse of [`screen_to_world`].
pub fn world_to_screen(world: Vec2, viewport: Vec2, offset: Vec2, zoom: f32) -> Vec2 {
    (world - offset) * zoom + viewport * 0.5
}

fn setup_camera(mut commands: Commands, bounds: Res<WorldBounds>) {
    let offset = bounds.center();
    let zoom = 0.6;

    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scale: 1.0 / zoom,
            ..OrthographicProjection::default_2d()
        },
        Transform::from_xyz(offset.x, -offset.y, 0.0),
        WorldCamera { offset, zoom },
    ));

    info!("Camera centered on {:?} at {}x zoom", offset, zoom);
}

fn camera_zoom(
    mut scroll_events: EventReader<MouseWheel>,
    mut cameras: Query<&mut WorldCamera>,
) {
    let scroll: f32 = scroll_events.read().map(|e| e.y).sum();
    if scroll == 0.0 {
        return;
    }

    for mut camera in &mut cameras {
        camera.zoom = (camera.zoom + scroll * ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }
}

fn camera_keyboard_pan(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut cameras: Query<&mut WorldCamera>,
) {
    let mut direction = Vec2::ZERO;

    // World y grows downward, so W moves the view up by shrinking offset.y.
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        direction.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        direction.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }

    if direction == Vec2::ZERO {
        return;
    }

    for mut camera in &mut cameras {
        // Constant on-screen pan speed regardless of zoom level.
        let speed = PAN_SPEED / camera.zoom;
        camera.offset += direction.normalize() * speed * time.delta_secs();
    }
}

fn camera_transform_sync(
    mut cameras: Query<(&WorldCamera, &mut Transform, &mut OrthographicProjection)>,
) {
    for (camera, mut transform, mut projection) in &mut cameras {
        transform.translation.x = camera.offset.x;
        transform.translation.y = -camera.offset.y;
        projection.scale = 1.0 / camera.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_center_maps_to_camera_offset() {
        let viewport = Vec2::new(800.0, 600.0);
        let offset = Vec2::new(400.0, 300.0);
        let world = screen_to_world(viewport * 0.5, viewport, offset, 1.0);
        assert_eq!(world, offset);
    }

    #[test]
    fn camera_centered_on_character_hits_it_at_canvas_center() {
        // 800x600 canvas, 1x zoom, camera parked on the character's position.
        let viewport = Vec2::new(800.0, 600.0);
        let character = Vec2::new(400.0, 300.0);
        let world = screen_to_world(Vec2::new(400.0, 300.0), viewport, character, 1.0);
        assert_eq!(world, character);
        assert_eq!(
            world_to_screen(character, viewport, character, 1.0),
            Vec2::new(400.0, 300.0)
        );
    }

    #[test]
    fn mapping_round_trips_under_zoom_and_offset() {
        let viewport = Vec2::new(1280.0, 720.0);
        let offset = Vec2::new(911.0, 204.5);
        let zoom = 2.5;
        let screen = Vec2::new(37.0, 650.0);
        let back = world_to_screen(
            screen_to_world(screen, viewport, offset, zoom),
            viewport,
            offset,
            zoom,
        );
        assert!((back - screen).length() < 1e-3);
    }

    #[test]
    fn zoom_scales_world_distance_per_pixel() {
        let viewport = Vec2::new(800.0, 600.0);
        let offset = Vec2::ZERO;
        let a = screen_to_world(Vec2::new(410.0, 300.0), viewport, offset, 2.0);
        // Ten screen pixels at 2x zoom cover five world units.
        assert!((a.x - 5.0).abs() < 1e-6);
    }
}
