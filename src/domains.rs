//! Per-slot candidate sets. Each domain is a bit set over the word ids in its slot's length
//! bucket, so cloning a `Domains` yields a fully independent copy that later pruning can't touch.

use bit_set::BitSet;

use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{Word, WordId, WordList};

/// The remaining options for a single slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    length: usize,
    options: BitSet,
}

impl Domain {
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn contains(&self, word_id: WordId) -> bool {
        self.options.contains(word_id)
    }

    /// Iterate over the remaining word ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item=WordId> + '_ {
        self.options.iter()
    }

    /// Iterate over the remaining words themselves.
    pub fn words<'a>(&'a self, word_list: &'a WordList) -> impl Iterator<Item=(WordId, &'a Word)> {
        let bucket = word_list.words_of_length(self.length);
        self.options.iter().map(move |word_id| (word_id, &bucket[word_id]))
    }

    /// Remove every option for which `keep` returns false, returning how many were removed.
    pub fn retain<F>(&mut self, word_list: &WordList, mut keep: F) -> usize
        where
            F: FnMut(&Word) -> bool
    {
        let bucket = word_list.words_of_length(self.length);
        let doomed: Vec<WordId> =
            self.options.iter().filter(|&word_id| !keep(&bucket[word_id])).collect();

        for &word_id in &doomed {
            self.options.remove(word_id);
        }

        doomed.len()
    }
}

/// The remaining options for every slot in a grid, indexed by `SlotId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    domains: Vec<Domain>,
}

impl Domains {
    /// Give every slot all of the words that have the right length.
    pub fn new(config: &GridConfig) -> Domains {
        Domains {
            domains: config.slot_configs.iter().map(|slot_config| {
                let length = slot_config.length();
                let option_count = config.word_list.words_of_length(length).len();

                Domain {
                    length,
                    options: (0..option_count).collect(),
                }
            }).collect(),
        }
    }

    pub fn get(&self, slot_id: SlotId) -> &Domain {
        &self.domains[slot_id]
    }

    pub fn get_mut(&mut self, slot_id: SlotId) -> &mut Domain {
        &mut self.domains[slot_id]
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item=WordId> + '_ {
        self.domains[slot_id].iter()
    }

    /// Remove a single option, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].options.remove(word_id)
    }

    /// Shrink a slot's domain to the single given word.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) {
        let options = &mut self.domains[slot_id].options;
        options.clear();
        options.insert(word_id);
    }

    /// Were these domains built for `config`? Every slot needs a domain of its length, and every
    /// option has to be a word id in that length's bucket.
    pub fn fits(&self, config: &GridConfig) -> bool {
        self.domains.len() == config.slot_count()
            && self.domains.iter().zip(&config.slot_configs).all(|(domain, slot_config)| {
                let bucket_size = config.word_list.words_of_length(domain.length).len();
                domain.length == slot_config.length()
                    && domain.options.iter().all(|word_id| word_id < bucket_size)
            })
    }

    /// The id of the first slot with no options left, if any.
    pub fn first_empty(&self) -> Option<SlotId> {
        self.domains.iter().position(|domain| domain.is_empty())
    }

    /// The set of glyphs that appear at the given cell in any remaining option for the slot.
    pub fn glyphs_at(&self, word_list: &WordList, slot_id: SlotId, cell_idx: usize) -> BitSet {
        let mut glyphs = BitSet::with_capacity(word_list.glyphs.len());
        for (_, word) in self.domains[slot_id].words(word_list) {
            glyphs.insert(word.glyphs[cell_idx]);
        }
        glyphs
    }

    /// How many remaining options for the slot have each glyph at the given cell, indexed by
    /// `GlyphId`.
    pub fn glyph_counts_at(
        &self,
        word_list: &WordList,
        slot_id: SlotId,
        cell_idx: usize,
    ) -> Vec<usize> {
        let mut counts = vec![0; word_list.glyphs.len()];
        for (_, word) in self.domains[slot_id].words(word_list) {
            counts[word.glyphs[cell_idx]] += 1;
        }
        counts
    }

    /// Total number of options left across all slots.
    pub fn total_options(&self) -> usize {
        self.domains.iter().map(|domain| domain.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::domains::Domains;
    use crate::grid_config::{generate_grid_config_from_template_string, Direction, Slot};
    use crate::word_list::WordList;

    #[test]
    fn test_domains_are_filtered_by_length() {
        let config = generate_grid_config_from_template_string(
            WordList::new(["at", "no", "cat", "dog", "horse"]),
            "___\n_\n_\n_",
        ).unwrap();
        let domains = Domains::new(&config);

        let down = config.slot_id(&Slot::new(0, 0, Direction::Down, 4)).unwrap();
        let across = config.slot_id(&Slot::new(0, 0, Direction::Across, 3)).unwrap();

        assert!(domains.is_empty(down));
        assert_eq!(domains.get(down).length(), 4);
        assert_eq!(domains.first_empty(), Some(down));
        let across_words: Vec<_> = domains.get(across)
            .words(&config.word_list)
            .map(|(_, word)| word.string.as_str())
            .collect();
        assert_eq!(across_words, vec!["CAT", "DOG"]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let config = generate_grid_config_from_template_string(
            WordList::new(["at", "no", "an"]),
            "__",
        ).unwrap();
        let mut domains = Domains::new(&config);
        let snapshot = domains.clone();

        domains.restrict_to(0, 1);
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(snapshot.iter(0).collect::<Vec<_>>(), vec![0, 1, 2]);

        domains = snapshot.clone();
        assert!(domains.remove(0, 2));
        assert!(!domains.remove(0, 2));
        assert_eq!(domains.len(0), 2);
        assert_eq!(snapshot.len(0), 3);
    }

    #[test]
    fn test_glyphs_at() {
        let config = generate_grid_config_from_template_string(
            WordList::new(["at", "an", "no"]),
            "__",
        ).unwrap();
        let domains = Domains::new(&config);
        let word_list = &config.word_list;

        let letters_at = |cell_idx| {
            let mut letters: Vec<char> = domains.glyphs_at(word_list, 0, cell_idx)
                .iter()
                .map(|glyph| word_list.glyphs[glyph])
                .collect();
            letters.sort();
            letters
        };

        assert_eq!(letters_at(0), vec!['A', 'N']);
        assert_eq!(letters_at(1), vec!['N', 'O', 'T']);

        let counts = domains.glyph_counts_at(word_list, 0, 0);
        assert_eq!(counts[word_list.glyph_id('A').unwrap()], 2);
        assert_eq!(counts[word_list.glyph_id('N').unwrap()], 1);
        assert_eq!(counts[word_list.glyph_id('T').unwrap()], 0);
    }

    #[test]
    fn test_retain() {
        let config = generate_grid_config_from_template_string(
            WordList::new(["cat", "car", "cow"]),
            "___",
        ).unwrap();
        let mut domains = Domains::new(&config);

        let removed = domains.get_mut(0).retain(&config.word_list, |word| word.string.contains('A'));

        assert_eq!(removed, 1);
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(domains.total_options(), 2);
    }

    #[test]
    fn test_domains_fit_only_their_own_grid() {
        let word_list = || WordList::new(["at", "no", "cat"]);
        let config = generate_grid_config_from_template_string(word_list(), "___\n_\n_").unwrap();
        let other_config = generate_grid_config_from_template_string(word_list(), "__").unwrap();

        let mut domains = Domains::new(&config);
        assert!(domains.fits(&config));
        assert!(!domains.fits(&other_config));
        assert!(!Domains::new(&other_config).fits(&config));

        // There's only one word of length 3.
        domains.restrict_to(0, 5);
        assert!(!domains.fits(&config));
    }
}
