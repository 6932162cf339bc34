//! HUD panel and debug view toggles.

use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use crate::interaction::PointerState;
use crate::render::sprites::{CharacterSheets, SheetState};
use crate::simulation::characters::{CharacterId, Persona};
use crate::simulation::speech::AskLog;
use crate::simulation::SimulationConfig;

pub mod debug_render;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_plugins(debug_render::DebugRenderPlugin)
            .init_resource::<DebugConfig>()
            .add_systems(Startup, setup_hud)
            .add_systems(
                Update,
                (
                    update_fps_counter,
                    update_crowd_stats,
                    update_hover_line,
                    update_ask_line,
                    update_sim_status,
                    toggle_debug_views,
                ),
            );
    }
}

/// Configuration for debug visualization.
#[derive(Resource)]
pub struct DebugConfig {
    pub show_fps: bool,
    pub show_grid: bool,
    pub show_radii: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: true,
            show_grid: true,
            show_radii: false,
        }
    }
}

/// Characters in the hover line get their description cut to this.
const HOVER_DESCRIPTION_CHARS: usize = 42;

/// Marker for the FPS text entity.
#[derive(Component)]
struct FpsText;

/// Marker for the character counts line.
#[derive(Component)]
struct CrowdStatsText;

/// Marker for the hovered-character line.
#[derive(Component)]
struct HoverText;

/// Marker for the last-question tally line.
#[derive(Component)]
struct AskText;

/// Marker for simulation status text.
#[derive(Component)]
struct SimStatusText;

fn setup_hud(mut commands: Commands) {
    let panel_bg = Color::srgb(0.05, 0.05, 0.07);
    let border = Color::srgb(0.85, 0.65, 0.2);
    let bright = Color::srgb(0.95, 0.9, 0.75);
    let amber = Color::srgb(1.0, 0.75, 0.3);
    let dim = Color::srgb(0.8, 0.78, 0.7);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                right: Val::Px(10.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(10.0)),
                border: UiRect::all(Val::Px(1.0)),
                row_gap: Val::Px(6.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(panel_bg),
            BorderColor(border),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("AGORA // PLAZA MONITOR"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(amber),
            ));

            parent.spawn((
                Text::new("FPS: --"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(bright),
                FpsText,
            ));

            parent.spawn((
                Text::new("Characters: --"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(dim),
                CrowdStatsText,
            ));

            parent.spawn((
                Text::new("Hover: --"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(dim),
                HoverText,
            ));

            parent.spawn((
                Text::new("Q: --"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(dim),
                AskText,
            ));

            parent.spawn((
                Text::new("SIM: 1.0x | LIVE"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.95, 0.8)),
                SimStatusText,
            ));
        });

    // Bottom control reminder
    commands.spawn((
        Text::new(
            "Drag: Pan | Scroll: Zoom | WASD: Pan | Q: Ask | E: Ask all | \
             X: Sit | Click: Bubble | Space: Pause | F: FPS | G: Grid | C: Radii",
        ),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.75, 0.75, 0.68)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

/// FPS line for the HUD; `None` leaves the current text in place while a
/// fresh sample is still pending.
fn fps_readout(show_fps: bool, smoothed: Option<f64>) -> Option<String> {
    if !show_fps {
        return Some("FPS: --".to_owned());
    }
    smoothed.map(|value| format!("FPS: {value:.0}"))
}

fn update_fps_counter(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
    config: Res<DebugConfig>,
) {
    let smoothed = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed());
    let Some(line) = fps_readout(config.show_fps, smoothed) else {
        return;
    };

    for mut text in &mut query {
        if **text != line {
            **text = line.clone();
        }
    }
}

fn update_crowd_stats(
    characters: Query<&CharacterSheets>,
    mut query: Query<&mut Text, With<CrowdStatsText>>,
) {
    let total = characters.iter().count();
    let ready = characters
        .iter()
        .filter(|sheets| sheets.walk.state == SheetState::Ready)
        .count();

    for mut text in &mut query {
        **text = format!("Characters: {} ({} drawn)", total, ready);
    }
}

/// Cut a description to `max_chars`, marking the cut.
fn shorten(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

fn update_hover_line(
    pointer: Res<PointerState>,
    characters: Query<(&CharacterId, &Persona)>,
    mut query: Query<&mut Text, With<HoverText>>,
) {
    let line = pointer
        .hovered
        .and_then(|entity| characters.get(entity).ok())
        .map(|(id, persona)| {
            format!(
                "Hover: {} | {}",
                id.0,
                shorten(&persona.description, HOVER_DESCRIPTION_CHARS)
            )
        })
        .unwrap_or_else(|| "Hover: --".to_owned());

    for mut text in &mut query {
        if **text != line {
            **text = line.clone();
        }
    }
}

fn update_ask_line(log: Res<AskLog>, mut query: Query<&mut Text, With<AskText>>) {
    if !log.is_changed() {
        return;
    }

    let line = if log.question.is_empty() {
        "Q: --".to_owned()
    } else {
        format!("Q: {} | yes {} / no {}", log.question, log.yes, log.no)
    };

    for mut text in &mut query {
        **text = line.clone();
    }
}

fn update_sim_status(
    config: Res<SimulationConfig>,
    mut query: Query<&mut Text, With<SimStatusText>>,
) {
    if !config.is_changed() {
        return;
    }

    let status = if config.paused { "PAUSED" } else { "LIVE" };
    for mut text in &mut query {
        **text = format!("SIM: {:.1}x | {}", config.speed, status);
    }
}

/// Toggle debug visualization modes with keyboard.
fn toggle_debug_views(keys: Res<ButtonInput<KeyCode>>, mut config: ResMut<DebugConfig>) {
    if keys.just_pressed(KeyCode::KeyF) {
        config.show_fps = !config.show_fps;
        info!("FPS readout: {}", if config.show_fps { "ON" } else { "OFF" });
    }

    if keys.just_pressed(KeyCode::KeyG) {
        config.show_grid = !config.show_grid;
        info!(
            "Grid overlay: {}",
            if config.show_grid { "ON" } else { "OFF" }
        );
    }

    if keys.just_pressed(KeyCode::KeyC) {
        config.show_radii = !config.show_radii;
        info!(
            "Interaction radii: {}",
            if config.show_radii { "ON" } else { "OFF" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_readout_blanks_when_toggled_off() {
        assert_eq!(fps_readout(true, Some(59.6)), Some("FPS: 60".to_owned()));
        assert_eq!(fps_readout(true, None), None);
        assert_eq!(fps_readout(false, Some(59.6)), Some("FPS: --".to_owned()));
    }

    #[test]
    fn short_descriptions_pass_through_unmarked() {
        assert_eq!(shorten("A boy with dark hair.", 42), "A boy with dark hair.");
    }

    #[test]
    fn long_descriptions_are_cut_and_marked() {
        let long = "A girl with olive skin and long curly chestnut hair, wearing a teal shirt.";
        let short = shorten(long, 42);
        assert_eq!(short.chars().count(), 45);
        assert!(short.ends_with("..."));
    }
}
