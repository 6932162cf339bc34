//! Sprite sheet slots: async load polling, grid slicing, and cell selection.
//!
//! Each character carries two sheets in the standard layout: a 9x4 walk
//! cycle (one row per facing) and a 3x4 overlay sheet whose center-bottom
//! cell is the seated pose. Sheets start as plain image loads; once the
//! image arrives we derive the cell size from its dimensions and build the
//! atlas layout, so differently sized sheets slice correctly as long as
//! they keep the grid.

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::simulation::characters::{AnimationState, CharacterId, CharacterState, Facing};

/// Frames per facing row of a walk sheet.
pub const WALK_COLUMNS: u32 = 9;
/// Facing rows in both sheet layouts.
pub const SHEET_ROWS: u32 = 4;
/// Columns of the overlay sheet that holds the seated pose.
pub const SIT_COLUMNS: u32 = 3;

/// (column, row) of the seated pose inside the overlay sheet.
const SIT_CELL: (u32, u32) = (1, 2);

/// Where a sheet is in its life. `Unloaded` slots had no path and are
/// never polled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

/// One sheet: the image handle plus the atlas layout built after load.
#[derive(Debug)]
pub struct SheetSlot {
    pub image: Handle<Image>,
    pub layout: Option<Handle<TextureAtlasLayout>>,
    pub state: SheetState,
    pub columns: u32,
    pub rows: u32,
}

impl SheetSlot {
    /// Kick off an image load. An empty path yields an inert slot.
    pub fn load(asset_server: &AssetServer, path: &str, columns: u32, rows: u32) -> Self {
        if path.is_empty() {
            return Self {
                image: Handle::default(),
                layout: None,
                state: SheetState::Unloaded,
                columns,
                rows,
            };
        }
        Self {
            image: asset_server.load(path.to_owned()),
            layout: None,
            state: SheetState::Loading,
            columns,
            rows,
        }
    }
}

/// The two sheets of one character.
#[derive(Component)]
pub struct CharacterSheets {
    pub walk: SheetSlot,
    pub sit: SheetSlot,
}

/// Cell size of a sheet image, or `None` when the image does not divide
/// evenly into the expected grid.
fn grid_cell(size: UVec2, columns: u32, rows: u32) -> Option<UVec2> {
    if size.x == 0 || size.y == 0 || size.x % columns != 0 || size.y % rows != 0 {
        return None;
    }
    Some(UVec2::new(size.x / columns, size.y / rows))
}

/// Atlas index of a walk frame.
fn walk_cell_index(facing: Facing, frame: usize) -> usize {
    facing.sheet_row() * WALK_COLUMNS as usize + frame
}

/// Atlas index of the seated pose.
fn sit_cell_index() -> usize {
    (SIT_CELL.1 * SIT_COLUMNS + SIT_CELL.0) as usize
}

/// Drive `Loading` slots forward: build the atlas layout once the image is
/// in, or park the slot as `Failed` on a bad load or off-grid dimensions.
pub fn poll_sheet_loads(
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut characters: Query<(&CharacterId, &mut CharacterSheets)>,
) {
    for (id, mut sheets) in &mut characters {
        let CharacterSheets { walk, sit } = &mut *sheets;
        for slot in [walk, sit] {
            if slot.state != SheetState::Loading {
                continue;
            }
            match asset_server.load_state(slot.image.id()) {
                LoadState::Loaded => {
                    let Some(image) = images.get(&slot.image) else {
                        continue;
                    };
                    match grid_cell(image.size(), slot.columns, slot.rows) {
                        Some(cell) => {
                            slot.layout = Some(layouts.add(TextureAtlasLayout::from_grid(
                                cell,
                                slot.columns,
                                slot.rows,
                                None,
                                None,
                            )));
                            slot.state = SheetState::Ready;
                        }
                        None => {
                            warn!(
                                "Sheet for {} is {}x{}, not a {}x{} grid",
                                id.0,
                                image.size().x,
                                image.size().y,
                                slot.columns,
                                slot.rows
                            );
                            slot.state = SheetState::Failed;
                        }
                    }
                }
                LoadState::Failed(_) => {
                    warn!("Failed to load a sheet for {}", id.0);
                    slot.state = SheetState::Failed;
                }
                LoadState::NotLoaded | LoadState::Loading => {}
            }
        }
    }
}

/// Point every sprite at the cell for its state: the seated pose while
/// sitting (when that sheet made it in), the walk frame otherwise.
pub fn update_sprite_cells(
    mut characters: Query<(
        &CharacterSheets,
        &Facing,
        &AnimationState,
        &CharacterState,
        &mut Sprite,
    )>,
) {
    for (sheets, facing, anim, state, mut sprite) in &mut characters {
        let sitting = matches!(state, CharacterState::Sitting { .. });
        let (slot, index) = if sitting && sheets.sit.state == SheetState::Ready {
            (&sheets.sit, sit_cell_index())
        } else {
            (&sheets.walk, walk_cell_index(*facing, anim.frame))
        };
        let Some(layout) = slot.layout.clone() else {
            continue;
        };

        if sprite.image != slot.image {
            sprite.image = slot.image.clone();
        }
        match sprite.texture_atlas.as_mut() {
            Some(atlas) if atlas.layout == layout => {
                if atlas.index != index {
                    atlas.index = index;
                }
            }
            _ => sprite.texture_atlas = Some(TextureAtlas { layout, index }),
        }
    }
}

/// Characters spawn hidden and appear once their walk sheet is usable.
pub fn sync_visibility(mut characters: Query<(&CharacterSheets, &mut Visibility)>) {
    for (sheets, mut visibility) in &mut characters {
        let target = if sheets.walk.state == SheetState::Ready {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != target {
            *visibility = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_rows_follow_facing_order() {
        assert_eq!(walk_cell_index(Facing::Up, 0), 0);
        assert_eq!(walk_cell_index(Facing::Left, 0), 9);
        assert_eq!(walk_cell_index(Facing::Down, 0), 18);
        assert_eq!(walk_cell_index(Facing::Right, 0), 27);
        assert_eq!(walk_cell_index(Facing::Down, 8), 26);
    }

    #[test]
    fn seated_pose_is_center_of_third_row() {
        assert_eq!(sit_cell_index(), 7);
    }

    #[test]
    fn standard_sheets_slice_to_64_pixel_cells() {
        assert_eq!(
            grid_cell(UVec2::new(576, 256), WALK_COLUMNS, SHEET_ROWS),
            Some(UVec2::new(64, 64))
        );
        assert_eq!(
            grid_cell(UVec2::new(192, 256), SIT_COLUMNS, SHEET_ROWS),
            Some(UVec2::new(64, 64))
        );
    }

    #[test]
    fn off_grid_dimensions_are_rejected() {
        assert_eq!(grid_cell(UVec2::new(577, 256), WALK_COLUMNS, SHEET_ROWS), None);
        assert_eq!(grid_cell(UVec2::new(576, 0), WALK_COLUMNS, SHEET_ROWS), None);
    }
}
