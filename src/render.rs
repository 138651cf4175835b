use crate::assignment::Assignment;
use crate::grid_config::GridConfig;

/// Character used for blocked cells in rendered output.
pub const BLOCK_CHAR: char = '█';

/// Project each assigned word onto its slot's cells. Blocked cells and open cells no assigned slot
/// covers are None.
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.grid.width]; config.grid.height];

    for choice in assignment.choices() {
        let slot = config.slot(choice.slot_id);
        let Some(word) = assignment.word(config, choice.slot_id) else {
            continue;
        };

        for ((row, col), &glyph) in slot.cells().zip(&word.glyphs) {
            letters[row][col] = Some(config.word_list.glyphs[glyph]);
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, one line per row.
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    let letters = letter_grid(config, assignment);

    letters.iter().enumerate().map(|(row, row_letters)| {
        row_letters.iter().enumerate().map(|(col, letter)| {
            if config.grid.is_open(row, col) {
                letter.unwrap_or(' ')
            } else {
                BLOCK_CHAR
            }
        }).collect::<String>()
    }).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use crate::assignment::Assignment;
    use crate::grid_config::generate_grid_config_from_template_string;
    use crate::render::{letter_grid, render_grid};
    use crate::word_list::WordList;

    /// ___
    /// _##
    /// _#_
    #[test]
    fn test_letter_grid() {
        let config = generate_grid_config_from_template_string(
            WordList::new(["cat", "cow"]),
            "___\n_##\n_#_",
        ).unwrap();
        let mut assignment = Assignment::new(config.slot_count());

        // Down slot comes first.
        assignment.insert(0, config.word_list.find("cow").unwrap());
        assignment.insert(1, config.word_list.find("cat").unwrap());

        let letters = letter_grid(&config, &assignment);

        assert_eq!(letters, vec![
            vec![Some('C'), Some('A'), Some('T')],
            vec![Some('O'), None, None],
            vec![Some('W'), None, None],
        ]);
        assert_eq!(render_grid(&config, &assignment), "CAT\nO██\nW█ ");
    }

    #[test]
    fn test_render_partial_assignment() {
        let config = generate_grid_config_from_template_string(
            WordList::new(["cat", "cow"]),
            "___\n_##\n_##",
        ).unwrap();
        let mut assignment = Assignment::new(config.slot_count());
        assignment.insert(1, config.word_list.find("cat").unwrap());

        assert_eq!(render_grid(&config, &assignment), "CAT\n ██\n ██");
    }
}
