//! Speech bubbles: a backdrop sprite plus wrapped Text2d above the speaker.
//!
//! Bubbles are child entities rebuilt whenever the spoken line changes.
//! The backdrop is sized from a glyph-box estimate of the wrapped text,
//! which tracks the real layout closely enough at this font size.

use bevy::prelude::*;
use bevy::text::TextBounds;

use crate::render::Y_SORT_FACTOR;
use crate::simulation::characters::CharacterConfig;
use crate::simulation::speech::Speech;

/// Wrap width of the bubble text.
const BUBBLE_TEXT_WIDTH: f32 = 170.0;
const BUBBLE_PADDING: Vec2 = Vec2::new(9.0, 7.0);
const BUBBLE_FONT_SIZE: f32 = 13.0;
/// Estimated advance per glyph at the bubble font size.
const GLYPH_WIDTH: f32 = 7.0;
const LINE_HEIGHT: f32 = 16.0;
/// Clearance between the speaker's head and the bubble.
const BUBBLE_GAP: f32 = 10.0;
const BUBBLE_BG: Color = Color::srgba(0.98, 0.98, 0.96, 0.92);
const BUBBLE_TEXT: Color = Color::srgb(0.12, 0.12, 0.14);

/// Above the owning sprite but below anything more than half a world unit
/// in front of it.
const BUBBLE_REL_Z: f32 = 0.4 * Y_SORT_FACTOR;

/// Marker on a bubble backdrop; holds the line it was built for.
#[derive(Component)]
pub struct SpeechBubble {
    text: String,
}

/// Estimated backdrop size for a line of bubble text.
fn bubble_extent(text: &str) -> Vec2 {
    let glyphs = text.chars().count() as f32;
    let per_line = (BUBBLE_TEXT_WIDTH / GLYPH_WIDTH).floor().max(1.0);
    let lines = (glyphs / per_line).ceil().max(1.0);
    let text_width = if lines > 1.0 {
        BUBBLE_TEXT_WIDTH
    } else {
        glyphs * GLYPH_WIDTH
    };
    Vec2::new(
        text_width + BUBBLE_PADDING.x * 2.0,
        lines * LINE_HEIGHT + BUBBLE_PADDING.y * 2.0,
    )
}

fn spawn_bubble(commands: &mut Commands, speaker: Entity, text: &str, character_height: f32) {
    let size = bubble_extent(text);
    let bubble = commands
        .spawn((
            SpeechBubble {
                text: text.to_owned(),
            },
            Sprite::from_color(BUBBLE_BG, size),
            Transform::from_xyz(
                0.0,
                character_height * 0.5 + BUBBLE_GAP + size.y * 0.5,
                BUBBLE_REL_Z,
            ),
        ))
        .with_children(|backdrop| {
            backdrop.spawn((
                Text2d::new(text),
                TextFont {
                    font_size: BUBBLE_FONT_SIZE,
                    ..default()
                },
                TextColor(BUBBLE_TEXT),
                TextLayout::new_with_justify(JustifyText::Center),
                TextBounds {
                    width: Some(BUBBLE_TEXT_WIDTH),
                    height: None,
                },
                Transform::from_xyz(0.0, 0.0, 0.1 * Y_SORT_FACTOR),
            ));
        })
        .id();
    commands.entity(speaker).add_child(bubble);
}

/// Keep each character's bubble in step with its [`Speech`]: tear it down
/// when the line ends or is dismissed, rebuild it when the line changes.
pub fn sync_bubbles(
    mut commands: Commands,
    config: Res<CharacterConfig>,
    speakers: Query<(Entity, &Speech, Option<&Children>)>,
    bubbles: Query<(Entity, &SpeechBubble)>,
) {
    for (speaker, speech, children) in &speakers {
        let existing = children
            .into_iter()
            .flatten()
            .find_map(|child| bubbles.get(*child).ok());

        match (speech.visible(), existing) {
            (false, Some((bubble, _))) => commands.entity(bubble).despawn_recursive(),
            (true, Some((bubble, built))) if built.text != speech.text => {
                commands.entity(bubble).despawn_recursive();
                spawn_bubble(&mut commands, speaker, &speech.text, config.height);
            }
            (true, None) => spawn_bubble(&mut commands, speaker, &speech.text, config.height),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_grows_with_the_line() {
        let short = bubble_extent("Hi.");
        let longer = bubble_extent("Hello over there.");
        assert!(longer.x > short.x);
        assert_eq!(longer.y, short.y);
    }

    #[test]
    fn long_lines_wrap_instead_of_widening() {
        let wrapped = bubble_extent("I asked around the plaza and everyone said yes, twice.");
        assert_eq!(wrapped.x, BUBBLE_TEXT_WIDTH + BUBBLE_PADDING.x * 2.0);
        assert!(wrapped.y > bubble_extent("Hi.").y);
    }
}
