use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

use smallvec::SmallVec;
use thiserror::Error;

use crate::word_list::WordList;
use crate::MAX_SLOT_LENGTH;

/// The character marking an open cell in a grid template.
pub const OPEN_CELL: char = '_';

/// An identifier for a given slot, based on its index in the GridConfig's `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed (row, col) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A single crossword entry. Two slots are the same slot iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Slot {
        Slot { row, col, direction, length }
    }

    /// The coords of the cell at the given index within this slot.
    pub fn cell(self, cell_idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        }
    }

    /// Generate the coords for each cell of this slot, in order.
    pub fn cells(self) -> impl Iterator<Item=GridCoord> {
        (0..self.length).map(move |cell_idx| self.cell(cell_idx))
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.col, self.direction, self.length)
    }
}

/// The shape of a puzzle: which cells can hold a letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
    open: Vec<Vec<bool>>,
}

impl Grid {
    /// Build a grid from rows of open/blocked flags. Short rows are padded with blocked cells.
    pub fn new(rows: Vec<Vec<bool>>) -> Grid {
        let height = rows.len();
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        let open = rows.into_iter().map(|mut row| {
            row.resize(width, false);
            row
        }).collect();

        Grid { height, width, open }
    }

    /// Parse a grid template where `open_marker` represents an open cell and anything else
    /// (including a missing character at the end of a short line) represents a block.
    pub fn from_template(template: &str, open_marker: char) -> Grid {
        Grid::new(
            template.lines().map(|line| {
                line.chars().map(|c| c == open_marker).collect()
            }).collect()
        )
    }

    /// Is the given cell open? Anything outside the grid counts as blocked.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.open.get(row).and_then(|cells| cells.get(col)).cloned().unwrap_or(false)
    }
}

/// Find every maximal run of at least two open cells, scanning row by row. At a given start cell
/// the down slot comes before the across slot.
pub fn derive_slots(grid: &Grid) -> Vec<Slot> {
    let mut slots = vec![];

    for row in 0..grid.height {
        for col in 0..grid.width {
            if !grid.is_open(row, col) {
                continue;
            }

            if row == 0 || !grid.is_open(row - 1, col) {
                let length = (row..grid.height).take_while(|&r| grid.is_open(r, col)).count();
                if length > 1 {
                    slots.push(Slot::new(row, col, Direction::Down, length));
                }
            }

            if col == 0 || !grid.is_open(row, col - 1) {
                let length = (col..grid.width).take_while(|&c| grid.is_open(row, c)).count();
                if length > 1 {
                    slots.push(Slot::new(row, col, Direction::Across, length));
                }
            }
        }
    }

    slots
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub slot: Slot,
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,

    /// Ids of every slot crossing this one, ascending.
    pub neighbors: Vec<SlotId>,
}

impl SlotConfig {
    pub fn length(&self) -> usize {
        self.slot.length
    }
}

/// Problems with a grid that make it meaningless to search for a fill.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridConfigError {
    #[error("grid has no runs of two or more open cells")]
    NoSlots,
    #[error("slots {first} and {second} share more than one cell")]
    MultipleOverlaps { first: Slot, second: Slot },
    #[error("more than two slots cross at cell {cell:?}")]
    TooManyCrossings { cell: GridCoord },
}

/// A struct representing the aspects of a grid that are static during filling.
pub struct GridConfig {
    pub grid: Grid,
    pub word_list: WordList,
    pub slot_configs: Vec<SlotConfig>,

    /// (index in first slot, index in second slot) of the shared cell, for each ordered pair of
    /// crossing slots.
    overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,
    slot_ids: HashMap<Slot, SlotId>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("height", &self.grid.height)
            .field("width", &self.grid.width)
            .field("slot_configs", &self.slot_configs)
            .field("word_list", &self.word_list)
            .finish()
    }
}

impl GridConfig {
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn slot(&self, slot_id: SlotId) -> Slot {
        self.slot_configs[slot_id].slot
    }

    /// Map a slot back to its id, if it's part of this grid.
    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_ids.get(slot).cloned()
    }

    /// Where the two slots cross, as (index in `a`, index in `b`), or None if they don't.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.overlaps.get(&(a, b)).cloned()
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.slot_configs[slot_id].neighbors
    }
}

/// Generate a GridConfig from an explicit set of slots. Slots shorter than two cells are dropped
/// and repeated slots collapse. The grid is the set of cells covered by any slot.
pub fn generate_grid_config(
    word_list: WordList,
    slots: &[Slot],
) -> Result<GridConfig, GridConfigError> {
    let slots: Vec<Slot> = slots.iter().filter(|slot| slot.length > 1).cloned().collect();

    let height = slots.iter().flat_map(|slot| slot.cells()).map(|(row, _)| row + 1).max().unwrap_or(0);
    let width = slots.iter().flat_map(|slot| slot.cells()).map(|(_, col)| col + 1).max().unwrap_or(0);
    let mut open = vec![vec![false; width]; height];
    for (row, col) in slots.iter().flat_map(|slot| slot.cells()) {
        open[row][col] = true;
    }

    build_grid_config(word_list, Grid::new(open), slots)
}

/// Generate a GridConfig for every slot in the given grid.
pub fn generate_grid_config_from_grid(
    word_list: WordList,
    grid: Grid,
) -> Result<GridConfig, GridConfigError> {
    let slots = derive_slots(&grid);
    build_grid_config(word_list, grid, slots)
}

/// Generate a grid config from a string template, with `_` representing open cells and anything
/// else representing blocks.
pub fn generate_grid_config_from_template_string(
    word_list: WordList,
    template: &str,
) -> Result<GridConfig, GridConfigError> {
    generate_grid_config_from_grid(word_list, Grid::from_template(template, OPEN_CELL))
}

/// Generate a GridConfig representing a fully open square grid.
pub fn generate_square_grid_config(
    word_list: WordList,
    square_size: usize,
) -> Result<GridConfig, GridConfigError> {
    generate_grid_config_from_grid(word_list, Grid::new(vec![vec![true; square_size]; square_size]))
}

fn build_grid_config(
    word_list: WordList,
    grid: Grid,
    slots: Vec<Slot>,
) -> Result<GridConfig, GridConfigError> {
    let mut slot_ids: HashMap<Slot, SlotId> = HashMap::new();
    let mut unique_slots: Vec<Slot> = vec![];
    for slot in slots {
        if !slot_ids.contains_key(&slot) {
            slot_ids.insert(slot, unique_slots.len());
            unique_slots.push(slot);
        }
    }

    if unique_slots.is_empty() {
        return Err(GridConfigError::NoSlots);
    }

    // Build a map from cell location to (slot id, cell index within slot), which we can then use
    // to calculate overlaps.
    let mut entries_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();
    for (slot_id, slot) in unique_slots.iter().enumerate() {
        for (cell_idx, loc) in slot.cells().enumerate() {
            entries_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
        }
    }

    let mut overlaps: HashMap<(SlotId, SlotId), (usize, usize)> = HashMap::new();
    let mut crossings: Vec<SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>> = unique_slots
        .iter()
        .map(|slot| (0..slot.length).map(|_| None).collect())
        .collect();

    // Visit cells in slot order so that the result doesn't depend on hash iteration order.
    for (slot_id, slot) in unique_slots.iter().enumerate() {
        for (cell_idx, loc) in slot.cells().enumerate() {
            let entries = &entries_by_loc[&loc];
            if entries.len() > 2 {
                return Err(GridConfigError::TooManyCrossings { cell: loc });
            }

            for &(other_slot_id, other_slot_cell) in entries {
                if other_slot_id == slot_id {
                    continue;
                }

                if let Some(&(existing_cell, _)) = overlaps.get(&(slot_id, other_slot_id)) {
                    if existing_cell != cell_idx {
                        return Err(GridConfigError::MultipleOverlaps {
                            first: *slot,
                            second: unique_slots[other_slot_id],
                        });
                    }
                }

                overlaps.insert((slot_id, other_slot_id), (cell_idx, other_slot_cell));
                crossings[slot_id][cell_idx] = Some(Crossing { other_slot_id, other_slot_cell });
            }
        }
    }

    let slot_configs = unique_slots.into_iter().zip(crossings).enumerate().map(
        |(id, (slot, crossings))| {
            let mut neighbors: Vec<SlotId> =
                crossings.iter().flatten().map(|crossing| crossing.other_slot_id).collect();
            neighbors.sort_unstable();
            neighbors.dedup();

            SlotConfig { id, slot, crossings, neighbors }
        }
    ).collect();

    Ok(GridConfig {
        grid,
        word_list,
        slot_configs,
        overlaps,
        slot_ids,
    })
}
