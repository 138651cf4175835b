//! Crossword filling as a constraint satisfaction problem: slots are variables, candidate words
//! are values, and crossing slots must agree on their shared letter.

use std::collections::HashMap;

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod render;
pub mod word_list;

pub use assignment::{Assignment, Choice};
pub use backtracking_search::{find_fill, FillFailure, FillOptions, FillSuccess, Propagation};
pub use grid_config::{Direction, Grid, GridConfig, GridConfigError, Slot};
pub use render::{letter_grid, render_grid};
pub use word_list::WordList;

/// The expected maximum number of distinct characters/rebuses/whatever appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Fill `grid` from `words`, returning the word chosen for every slot, or None if no fill exists.
pub fn solve<I, S>(grid: Grid, words: I) -> Result<Option<HashMap<Slot, String>>, GridConfigError>
    where
        I: IntoIterator<Item=S>,
        S: AsRef<str>,
{
    let config = grid_config::generate_grid_config_from_grid(WordList::new(words), grid)?;

    Ok(find_fill(&config, &FillOptions::default()).ok().map(|success| {
        success.assignment.to_entries(&config).into_iter().collect()
    }))
}

#[cfg(test)]
mod tests {
    use crate::grid_config::OPEN_CELL;
    use crate::{solve, Direction, Grid, GridConfigError, Slot};

    #[test]
    fn test_solve_single_slot() {
        let grid = Grid::from_template("__", OPEN_CELL);

        let fill = solve(grid.clone(), ["at", "no"]).unwrap().expect("Failed to find a fill");
        let word = &fill[&Slot::new(0, 0, Direction::Across, 2)];
        assert!(word == "AT" || word == "NO");

        assert_eq!(solve(grid, ["abc"]).unwrap(), None);
    }

    #[test]
    fn test_solve_rejects_grid_without_slots() {
        let grid = Grid::from_template("_#_", OPEN_CELL);

        assert_eq!(solve(grid, ["at"]).unwrap_err(), GridConfigError::NoSlots);
    }

    /// _____
    /// _#_#_
    /// _____
    #[test]
    fn test_solve_returns_every_slot() {
        let grid = Grid::from_template("_____\n_#_#_\n_____", OPEN_CELL);
        let words = ["cabin", "moped", "cam", "bop", "nod", "tee", "arm", "aim"];

        let fill = solve(grid, words).unwrap().expect("Failed to find a fill");

        assert_eq!(fill.len(), 5);
        assert_eq!(fill[&Slot::new(0, 0, Direction::Across, 5)], "CABIN");
        let mut values: Vec<&String> = fill.values().collect();
        values.sort();
        values.dedup();
        assert_eq!(values.len(), 5);
    }
}
