//! Character roster: who exists and which sprite sheets they use.
//!
//! Records normally come from a JSON manifest written by the character
//! generation pipeline, one entry per `chars/character_NNNN/` directory with
//! a walk, sit, and idle sheet each. Without a manifest a deterministic
//! generated roster stands in, assembled from the same appearance tables the
//! pipeline draws from. The simulation treats records as opaque: it needs
//! the id, the description, and the two sheet paths it actually draws.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

/// One character as the outside world describes it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CharacterRecord {
    pub id: String,
    pub description: String,
    pub walk_sheet: String,
    pub sit_sheet: String,
    /// Carried for completeness; the scene only draws walk and sit cells.
    #[serde(default)]
    pub idle_sheet: String,
}

/// Where records come from, and how many to synthesize without a manifest.
#[derive(Resource)]
pub struct RosterConfig {
    pub manifest_path: PathBuf,
    pub generated_count: usize,
    pub seed: u64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("assets/characters.json"),
            generated_count: 24,
            seed: 4242,
        }
    }
}

/// Failures while reading a roster manifest.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse roster manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("roster manifest {path} lists no characters")]
    Empty { path: PathBuf },
}

/// Load a roster manifest: a JSON array of [`CharacterRecord`]s.
pub fn load_manifest(path: &Path) -> Result<Vec<CharacterRecord>, RosterError> {
    let raw = fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_owned(),
        source,
    })?;
    let records: Vec<CharacterRecord> =
        serde_json::from_str(&raw).map_err(|source| RosterError::Parse {
            path: path.to_owned(),
            source,
        })?;
    if records.is_empty() {
        return Err(RosterError::Empty {
            path: path.to_owned(),
        });
    }
    Ok(records)
}

// Appearance tables of the generation pipeline.
const BODY_TYPES: &[&str] = &["boy", "girl"];
const SKIN_TONES: &[&str] = &["pale", "light", "tanned", "olive", "brown", "dark"];
const HAIR_STYLES: &[&str] = &["short", "long", "curly", "spiked", "braided", "buzzed"];
const HAIR_COLORS: &[&str] = &["black", "brown", "blonde", "auburn", "gray", "blue"];
const SHIRT_COLORS: &[&str] = &["red", "blue", "green", "yellow", "purple", "white"];
const LEG_COLORS: &[&str] = &["black", "navy", "brown", "gray", "green"];

/// Synthesize a deterministic roster of `count` characters.
///
/// Ids and sheet paths follow the generation pipeline's directory layout
/// (`character_0001` upward), so a later real asset drop lines up with the
/// generated records.
pub fn generate(count: usize, seed: u64) -> Vec<CharacterRecord> {
    let mut rng = StdRng::seed_from_u64(seed);

    (1..=count)
        .map(|number| {
            let id = format!("character_{number:04}");
            let description = format!(
                "A {} with {} skin and {} {} hair, wearing a {} shirt and {} pants.",
                pick(&mut rng, BODY_TYPES),
                pick(&mut rng, SKIN_TONES),
                pick(&mut rng, HAIR_STYLES),
                pick(&mut rng, HAIR_COLORS),
                pick(&mut rng, SHIRT_COLORS),
                pick(&mut rng, LEG_COLORS),
            );
            CharacterRecord {
                walk_sheet: format!("chars/{id}/walk.png"),
                sit_sheet: format!("chars/{id}/sit.png"),
                idle_sheet: format!("chars/{id}/idle.png"),
                description,
                id,
            }
        })
        .collect()
}

fn pick<'a>(rng: &mut StdRng, table: &'a [&'a str]) -> &'a str {
    table[rng.gen_range(0..table.len())]
}
