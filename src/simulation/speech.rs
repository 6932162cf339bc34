//! Speech: transient bubble text, ask/say events, and the response source.
//!
//! A spoken line lives on the character as text plus a millisecond countdown
//! decremented in tick units (16.67 ms per baseline tick). When the timer
//! drains, the text clears and a talking character goes back to wandering;
//! a sitting one stays seated. Replies come from a [`ResponseSource`] behind
//! a resource, so an external collaborator can stand in for the canned one,
//! and the `Say` event is the matching push-style entry point.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulation::characters::{CharacterState, Persona};
use crate::simulation::TickScale;

/// Milliseconds drained from a speech timer per baseline tick.
pub const MS_PER_TICK: f32 = 16.67;

const RESPONDER_SEED: u64 = 31337;

/// How long a spoken line stays up.
#[derive(Resource)]
pub struct SpeechConfig {
    pub duration_ms: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self { duration_ms: 5000.0 }
    }
}

/// Current bubble contents of one character. Empty text means nothing is
/// shown; `hidden` suppresses the bubble without touching text or timer.
#[derive(Component, Debug, Default)]
pub struct Speech {
    pub text: String,
    pub remaining_ms: f32,
    pub hidden: bool,
}

impl Speech {
    /// Whether the bubble should be on screen.
    pub fn visible(&self) -> bool {
        !self.text.is_empty() && !self.hidden
    }
}

/// Ask one character a question; the reply comes from the [`Responder`].
#[derive(Event)]
pub struct AskQuestion {
    pub target: Entity,
    pub question: String,
}

/// Deliver a line directly, bypassing the responder. An empty line clears
/// the bubble immediately.
#[derive(Event)]
pub struct Say {
    pub target: Entity,
    pub line: String,
}

/// Flip a character's bubble between shown and dismissed.
#[derive(Event)]
pub struct ToggleBubble {
    pub target: Entity,
}

/// The most recent question with its running yes/no tally, for the HUD.
#[derive(Resource, Default)]
pub struct AskLog {
    pub question: String,
    pub yes: usize,
    pub no: usize,
}

/// Where replies come from.
pub trait ResponseSource: Send + Sync + 'static {
    fn respond(&mut self, persona: &str, question: &str) -> String;
}

#[derive(Resource)]
pub struct Responder(pub Box<dyn ResponseSource>);

impl Default for Responder {
    fn default() -> Self {
        Self(Box::new(CannedResponder::default()))
    }
}

const CANNED_REPLIES: &[&str] = &[
    "Hmm, I was just thinking about that. Yes.",
    "I asked around the plaza and everyone said yes.",
    "Definitely yes.",
    "The benches told me yes.",
    "Not today, I think. No.",
    "I would rather keep wandering. No.",
    "Ask me again after I have had a sit. No.",
    "My feet say no.",
];

/// Stand-in responder: picks a canned line from a seeded stream.
pub struct CannedResponder {
    rng: StdRng,
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self {
            rng: StdRng::seed_from_u64(RESPONDER_SEED),
        }
    }
}

impl ResponseSource for CannedResponder {
    fn respond(&mut self, _persona: &str, _question: &str) -> String {
        CANNED_REPLIES[self.rng.gen_range(0..CANNED_REPLIES.len())].to_owned()
    }
}

/// Whether a reply reads as a yes: the tail of the line, minus its final
/// character (usually punctuation), contains "yes" or "Yes".
pub fn is_affirmative(reply: &str) -> bool {
    let chars: Vec<char> = reply.chars().collect();
    let start = chars.len().saturating_sub(30);
    let end = chars.len().saturating_sub(1);
    let tail: String = chars[start..end].iter().collect();
    tail.contains("yes") || tail.contains("Yes")
}

/// Put a line on a character: set text, rewind the timer, and move a
/// wandering character into Talking. Sitting takes priority and is kept.
fn deliver_line(speech: &mut Speech, state: &mut CharacterState, line: &str, duration_ms: f32) {
    if line.is_empty() {
        speech.text.clear();
        speech.remaining_ms = 0.0;
        if matches!(*state, CharacterState::Talking) {
            *state = CharacterState::Wandering;
        }
        return;
    }

    speech.text.clear();
    speech.text.push_str(line);
    speech.remaining_ms = duration_ms;
    if matches!(*state, CharacterState::Wandering) {
        *state = CharacterState::Talking;
    }
}

/// Drain one update's worth of time off a live line.
fn tick_line(speech: &mut Speech, state: &mut CharacterState, dt: f32) {
    if speech.text.is_empty() {
        return;
    }
    speech.remaining_ms -= MS_PER_TICK * dt;
    if speech.remaining_ms <= 0.0 {
        speech.text.clear();
        speech.remaining_ms = 0.0;
        if matches!(*state, CharacterState::Talking) {
            *state = CharacterState::Wandering;
        }
    }
}

pub fn apply_questions(
    mut events: EventReader<AskQuestion>,
    mut responder: ResMut<Responder>,
    mut log: ResMut<AskLog>,
    config: Res<SpeechConfig>,
    mut characters: Query<(&Persona, &mut Speech, &mut CharacterState)>,
) {
    for event in events.read() {
        let Ok((persona, mut speech, mut state)) = characters.get_mut(event.target) else {
            continue;
        };

        let reply = responder.0.respond(&persona.description, &event.question);

        if log.question != event.question {
            log.question = event.question.clone();
            log.yes = 0;
            log.no = 0;
        }
        if is_affirmative(&reply) {
            log.yes += 1;
        } else {
            log.no += 1;
        }

        deliver_line(&mut speech, &mut state, &reply, config.duration_ms);
    }
}

pub fn apply_spoken_lines(
    mut events: EventReader<Say>,
    config: Res<SpeechConfig>,
    mut characters: Query<(&mut Speech, &mut CharacterState)>,
) {
    for event in events.read() {
        let Ok((mut speech, mut state)) = characters.get_mut(event.target) else {
            continue;
        };
        deliver_line(&mut speech, &mut state, &event.line, config.duration_ms);
    }
}

pub fn apply_bubble_toggles(
    mut events: EventReader<ToggleBubble>,
    mut characters: Query<&mut Speech>,
) {
    for event in events.read() {
        let Ok(mut speech) = characters.get_mut(event.target) else {
            continue;
        };
        speech.hidden = !speech.hidden;
    }
}

pub fn tick_speech(
    tick: Res<TickScale>,
    mut characters: Query<(&mut Speech, &mut CharacterState)>,
) {
    let dt = tick.0;
    if dt == 0.0 {
        return;
    }
    for (mut speech, mut state) in &mut characters {
        tick_line(&mut speech, &mut state, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn talking(text: &str, duration_ms: f32) -> (Speech, CharacterState) {
        let mut speech = Speech::default();
        let mut state = CharacterState::Wandering;
        deliver_line(&mut speech, &mut state, text, duration_ms);
        (speech, state)
    }

    #[test]
    fn delivering_a_line_starts_talking() {
        let (speech, state) = talking("Definitely yes.", 3000.0);
        assert_eq!(speech.text, "Definitely yes.");
        assert_eq!(speech.remaining_ms, 3000.0);
        assert_eq!(state, CharacterState::Talking);
    }

    #[test]
    fn sitting_characters_speak_without_standing() {
        let mut speech = Speech::default();
        let mut state = CharacterState::Sitting {
            saved_velocity: Vec2::new(1.0, 0.0),
        };
        deliver_line(&mut speech, &mut state, "My feet say no.", 3000.0);
        assert!(matches!(state, CharacterState::Sitting { .. }));
        assert!(!speech.text.is_empty());
    }

    #[test]
    fn line_expires_on_the_hundred_eightieth_tick() {
        let (mut speech, mut state) = talking("hello", 3000.0);
        for _ in 0..179 {
            tick_line(&mut speech, &mut state, 1.0);
        }
        assert!(!speech.text.is_empty(), "expired a tick early");
        tick_line(&mut speech, &mut state, 1.0);
        assert!(speech.text.is_empty());
        assert_eq!(speech.remaining_ms, 0.0);
        assert_eq!(state, CharacterState::Wandering);
    }

    #[test]
    fn expiry_never_stands_a_sitting_character_up() {
        let mut speech = Speech::default();
        let mut state = CharacterState::Sitting {
            saved_velocity: Vec2::ZERO,
        };
        deliver_line(&mut speech, &mut state, "hello", 100.0);
        for _ in 0..10 {
            tick_line(&mut speech, &mut state, 1.0);
        }
        assert!(speech.text.is_empty());
        assert!(matches!(state, CharacterState::Sitting { .. }));
    }

    #[test]
    fn empty_line_clears_immediately() {
        let (mut speech, mut state) = talking("something", 3000.0);
        deliver_line(&mut speech, &mut state, "", 3000.0);
        assert!(speech.text.is_empty());
        assert_eq!(speech.remaining_ms, 0.0);
        assert_eq!(state, CharacterState::Wandering);
    }

    #[test]
    fn hidden_flag_is_independent_of_text() {
        let (mut speech, _) = talking("hi", 3000.0);
        assert!(speech.visible());
        speech.hidden = true;
        assert!(!speech.visible());
        assert_eq!(speech.text, "hi");
        assert_eq!(speech.remaining_ms, 3000.0);
    }

    #[test]
    fn affirmative_looks_at_the_reply_tail() {
        assert!(is_affirmative("Definitely yes."));
        assert!(is_affirmative("Hmm, I was just thinking about that. Yes."));
        assert!(!is_affirmative("My feet say no."));
        // "yes" early in a long reply does not count.
        assert!(!is_affirmative(
            "Yes was my first thought, but after pacing the square for a while I settled on no."
        ));
    }

    #[test]
    fn affirmative_check_is_case_sensitive_and_drops_the_last_character() {
        // Shouted agreement is not one of the two spellings checked for.
        assert!(!is_affirmative("I asked around the plaza and everyone said YES."));
        // The final character is outside the window, so a bare "yes" with no
        // trailing punctuation loses its "s" and reads as a no.
        assert!(!is_affirmative("yes"));
        assert!(is_affirmative("yes."));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn every_canned_reply_classifies_cleanly() {
        let yes = CANNED_REPLIES.iter().filter(|r| is_affirmative(r)).count();
        assert_eq!(yes, 4);
        assert_eq!(CANNED_REPLIES.len() - yes, 4);
    }
}
