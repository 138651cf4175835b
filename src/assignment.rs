use std::collections::HashMap;

use thiserror::Error;

use crate::grid_config::{GridConfig, Slot, SlotId};
use crate::word_list::{Word, WordId};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to words. Word ids are scoped to the length bucket of the slot
/// they're assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<Option<WordId>>,
    count: usize,
}

impl Assignment {
    /// An empty assignment for a grid with the given number of slots.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { words: vec![None; slot_count], count: 0 }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words.get(slot_id).cloned().flatten()
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    /// Assign a word to a slot, returning whatever was there before.
    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.words[slot_id].replace(word_id);
        if previous.is_none() {
            self.count += 1;
        }
        previous
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.words[slot_id].take();
        if previous.is_some() {
            self.count -= 1;
        }
        previous
    }

    /// Number of slots with a word.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn slot_count(&self) -> usize {
        self.words.len()
    }

    /// Does every slot have a word?
    pub fn is_complete(&self) -> bool {
        self.count == self.words.len()
    }

    /// Iterate over the assigned slots in slot order.
    pub fn choices(&self) -> impl Iterator<Item=Choice> + '_ {
        self.words.iter().enumerate().filter_map(|(slot_id, word_id)| {
            word_id.map(|word_id| Choice { slot_id, word_id })
        })
    }

    pub fn word<'a>(&self, config: &'a GridConfig, slot_id: SlotId) -> Option<&'a Word> {
        let word_id = self.get(slot_id)?;
        config.word_list.word(config.slot(slot_id).length, word_id)
    }

    /// The assignment as plain (slot, word) pairs, in slot order.
    pub fn to_entries(&self, config: &GridConfig) -> Vec<(Slot, String)> {
        self.choices().filter_map(|choice| {
            self.word(config, choice.slot_id)
                .map(|word| (config.slot(choice.slot_id), word.string.clone()))
        }).collect()
    }
}

/// Why an assignment isn't a consistent (partial) fill.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("slot {slot_id} holds word id {word_id}, which isn't a word of the right length")]
    UnknownWord { slot_id: SlotId, word_id: WordId },
    #[error("slots {first} and {second} hold the same word")]
    DuplicateWord { first: SlotId, second: SlotId },
    #[error("slots {first} and {second} disagree on the letter where they cross")]
    Mismatch { first: SlotId, second: SlotId },
}

/// Check a single pair of assigned slots against each other. Words of different lengths are
/// always distinct, and within a length bucket the word list has no duplicates, so comparing ids
/// is the same as comparing words.
fn check_pair(config: &GridConfig, a: Choice, b: Choice) -> Result<(), Violation> {
    let a_slot = config.slot(a.slot_id);
    let b_slot = config.slot(b.slot_id);

    if a_slot.length == b_slot.length && a.word_id == b.word_id {
        return Err(Violation::DuplicateWord { first: a.slot_id, second: b.slot_id });
    }

    if let Some((a_cell, b_cell)) = config.overlap(a.slot_id, b.slot_id) {
        let a_word = lookup_word(config, a)?;
        let b_word = lookup_word(config, b)?;

        if a_word.glyphs[a_cell] != b_word.glyphs[b_cell] {
            return Err(Violation::Mismatch { first: a.slot_id, second: b.slot_id });
        }
    }

    Ok(())
}

fn lookup_word(config: &GridConfig, choice: Choice) -> Result<&Word, Violation> {
    config.word_list
        .word(config.slot(choice.slot_id).length, choice.word_id)
        .ok_or(Violation::UnknownWord { slot_id: choice.slot_id, word_id: choice.word_id })
}

/// Check that every assigned word exists, no word is used twice, and every pair of assigned
/// crossing slots agrees at the crossing.
pub fn validate(config: &GridConfig, assignment: &Assignment) -> Result<(), Violation> {
    let mut slots_by_word: HashMap<(usize, WordId), SlotId> = HashMap::new();

    for choice in assignment.choices() {
        lookup_word(config, choice)?;

        let key = (config.slot(choice.slot_id).length, choice.word_id);
        if let Some(&first) = slots_by_word.get(&key) {
            return Err(Violation::DuplicateWord { first, second: choice.slot_id });
        }
        slots_by_word.insert(key, choice.slot_id);
    }

    for choice in assignment.choices() {
        for &neighbor_id in config.neighbors(choice.slot_id) {
            if neighbor_id < choice.slot_id {
                continue;
            }
            if let Some(word_id) = assignment.get(neighbor_id) {
                check_pair(config, choice, Choice { slot_id: neighbor_id, word_id })?;
            }
        }
    }

    Ok(())
}

pub fn is_consistent(config: &GridConfig, assignment: &Assignment) -> bool {
    validate(config, assignment).is_ok()
}

/// Would adding `choice` to an assignment that's already consistent keep it consistent? This is
/// the same pairwise check as `validate`, restricted to the pairs that involve the new slot.
pub fn is_consistent_extension(
    config: &GridConfig,
    assignment: &Assignment,
    choice: Choice,
) -> bool {
    if lookup_word(config, choice).is_err() {
        return false;
    }

    assignment.choices()
        .filter(|other| other.slot_id != choice.slot_id)
        .all(|other| check_pair(config, choice, other).is_ok())
}

/// Is this a complete, valid fill?
pub fn is_solution(config: &GridConfig, assignment: &Assignment) -> bool {
    assignment.slot_count() == config.slot_count()
        && assignment.is_complete()
        && is_consistent(config, assignment)
}

#[cfg(test)]
mod tests {
    use crate::assignment::{
        is_consistent, is_consistent_extension, is_solution, validate, Assignment, Choice,
        Violation,
    };
    use crate::grid_config::{generate_grid_config, Direction, GridConfig, Slot};
    use crate::word_list::WordList;

    /// An across slot and a down slot of length 3 crossing at (0, 0).
    fn crossing_config() -> GridConfig {
        generate_grid_config(
            WordList::new(["cat", "car", "cop", "dog"]),
            &[Slot::new(0, 0, Direction::Across, 3), Slot::new(0, 0, Direction::Down, 3)],
        ).unwrap()
    }

    fn assign(config: &GridConfig, entries: &[(usize, &str)]) -> Assignment {
        let mut assignment = Assignment::new(config.slot_count());
        for &(slot_id, word) in entries {
            assignment.insert(slot_id, config.word_list.find(word).unwrap());
        }
        assignment
    }

    #[test]
    fn test_assignment_bookkeeping() {
        let mut assignment = Assignment::new(3);

        assert!(assignment.is_empty());
        assert_eq!(assignment.insert(1, 4), None);
        assert_eq!(assignment.insert(1, 5), Some(4));
        assert_eq!(assignment.len(), 1);
        assert!(assignment.contains(1));
        assert!(!assignment.contains(7));
        assert_eq!(assignment.choices().collect::<Vec<_>>(), vec![Choice { slot_id: 1, word_id: 5 }]);
        assert_eq!(assignment.remove(1), Some(5));
        assert_eq!(assignment.remove(1), None);
        assert!(assignment.is_empty());
    }

    #[test]
    fn test_matching_crossing_is_accepted() {
        let config = crossing_config();
        let assignment = assign(&config, &[(0, "car"), (1, "cop")]);

        assert_eq!(validate(&config, &assignment), Ok(()));
        assert!(is_solution(&config, &assignment));
        assert_eq!(assignment.to_entries(&config), vec![
            (Slot::new(0, 0, Direction::Across, 3), "CAR".to_string()),
            (Slot::new(0, 0, Direction::Down, 3), "COP".to_string()),
        ]);
    }

    #[test]
    fn test_mismatched_crossing_is_rejected() {
        let config = crossing_config();
        let assignment = assign(&config, &[(0, "cat"), (1, "dog")]);

        assert_eq!(validate(&config, &assignment), Err(Violation::Mismatch { first: 0, second: 1 }));
        assert!(!is_consistent(&config, &assignment));
    }

    #[test]
    fn test_duplicate_words_are_rejected() {
        let config = generate_grid_config(
            WordList::new(["cat"]),
            &[Slot::new(0, 0, Direction::Across, 3), Slot::new(2, 0, Direction::Across, 3)],
        ).unwrap();
        let assignment = assign(&config, &[(0, "cat"), (1, "cat")]);

        assert_eq!(
            validate(&config, &assignment),
            Err(Violation::DuplicateWord { first: 0, second: 1 }),
        );
    }

    #[test]
    fn test_unknown_word_is_rejected() {
        let config = crossing_config();
        let mut assignment = Assignment::new(config.slot_count());
        assignment.insert(0, 99);

        assert_eq!(validate(&config, &assignment), Err(Violation::UnknownWord { slot_id: 0, word_id: 99 }));
    }

    #[test]
    fn test_partial_assignment() {
        let config = crossing_config();
        let assignment = assign(&config, &[(0, "cat")]);

        assert!(is_consistent(&config, &assignment));
        assert!(!is_solution(&config, &assignment));
    }

    #[test]
    fn test_consistent_extension_matches_full_check() {
        let config = crossing_config();
        let partial = assign(&config, &[(0, "cat")]);

        for word in ["cat", "car", "cop", "dog"] {
            let word_id = config.word_list.find(word).unwrap();
            let mut extended = partial.clone();
            extended.insert(1, word_id);

            assert_eq!(
                is_consistent_extension(&config, &partial, Choice { slot_id: 1, word_id }),
                is_consistent(&config, &extended),
                "{}", word,
            );
        }
    }
}
