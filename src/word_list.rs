use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given letter or whatever, based on its index in the WordList's `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the WordList's `words` field (within the
/// relevant length bucket).
pub type WordId = usize;

/// A struct representing a word that can be chosen for a given slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

/// The vocabulary available for filling, bucketed by length. Every entry is upper-cased, purely
/// alphabetic and unique.
pub struct WordList {
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    pub words: Vec<Vec<Word>>,
    glyph_ids_by_char: HashMap<char, GlyphId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &(["(", &self.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

/// Turn a raw entry into its canonical form, or None if it can't be used as a crossword answer.
pub fn normalize_word(raw: &str) -> Option<String> {
    let word = raw.trim().to_uppercase();

    if word.is_empty() || !word.chars().all(char::is_alphabetic) {
        None
    } else {
        Some(word)
    }
}

impl WordList {
    /// Build a word list from raw entries. Malformed entries are dropped here so that the search
    /// never has to deal with them, and duplicates collapse onto their first occurrence.
    pub fn new<I, S>(raw_words: I) -> WordList
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        let mut word_list = WordList {
            glyphs: SmallVec::new(),
            words: vec![],
            glyph_ids_by_char: HashMap::new(),
        };
        let mut seen: HashSet<String> = HashSet::new();

        for raw_word in raw_words {
            let Some(word) = normalize_word(raw_word.as_ref()) else {
                continue;
            };
            if !seen.insert(word.clone()) {
                continue;
            }

            let glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]> =
                word.chars().map(|c| word_list.intern_glyph(c)).collect();
            let len = glyphs.len();

            if word_list.words.len() <= len {
                word_list.words.resize_with(len + 1, Vec::new);
            }
            word_list.words[len].push(Word { string: word, glyphs });
        }

        word_list
    }

    /// Build a word list from newline-separated text.
    pub fn from_text(text: &str) -> WordList {
        WordList::new(text.lines())
    }

    fn intern_glyph(&mut self, c: char) -> GlyphId {
        if let Some(&id) = self.glyph_ids_by_char.get(&c) {
            return id;
        }
        let id = self.glyphs.len();
        self.glyphs.push(c);
        self.glyph_ids_by_char.insert(c, id);
        id
    }

    /// All words of the given length, in the order they were first seen.
    pub fn words_of_length(&self, length: usize) -> &[Word] {
        self.words.get(length).map(|bucket| bucket.as_slice()).unwrap_or(&[])
    }

    pub fn word(&self, length: usize, word_id: WordId) -> Option<&Word> {
        self.words.get(length).and_then(|bucket| bucket.get(word_id))
    }

    /// Look up the id of a word, normalizing it first.
    pub fn find(&self, raw: &str) -> Option<WordId> {
        let word = normalize_word(raw)?;
        self.words_of_length(word.chars().count())
            .iter()
            .position(|candidate| candidate.string == word)
    }

    pub fn glyph_id(&self, c: char) -> Option<GlyphId> {
        self.glyph_ids_by_char.get(&c).cloned()
    }

    /// Total number of distinct words.
    pub fn len(&self) -> usize {
        self.words.iter().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::word_list::{normalize_word, WordList};

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("cat"), Some("CAT".to_string()));
        assert_eq!(normalize_word("  Dog \r"), Some("DOG".to_string()));
        assert_eq!(normalize_word(""), None);
        assert_eq!(normalize_word("   "), None);
        assert_eq!(normalize_word("it's"), None);
        assert_eq!(normalize_word("r2d2"), None);
    }

    #[test]
    fn test_words_are_bucketed_by_length_and_deduplicated() {
        let word_list = WordList::new(["cat", "AT", "Cat", "no", "", "x-ray", "horse"]);

        assert_eq!(word_list.len(), 4);
        let twos: Vec<_> = word_list.words_of_length(2).iter().map(|w| w.string.as_str()).collect();
        assert_eq!(twos, vec!["AT", "NO"]);
        assert_eq!(word_list.words_of_length(3).len(), 1);
        assert_eq!(word_list.words_of_length(5)[0].string, "HORSE");
        assert!(word_list.words_of_length(4).is_empty());
        assert!(word_list.words_of_length(40).is_empty());
    }

    #[test]
    fn test_glyphs_are_shared_between_words() {
        let word_list = WordList::from_text("at\nta\n");

        assert_eq!(word_list.glyphs.len(), 2);
        let at = &word_list.words_of_length(2)[0];
        let ta = &word_list.words_of_length(2)[1];
        assert_eq!(at.glyphs[0], ta.glyphs[1]);
        assert_eq!(at.glyphs[1], ta.glyphs[0]);
        assert_eq!(word_list.glyph_id('A'), Some(at.glyphs[0]));
        assert_eq!(word_list.glyph_id('Z'), None);
    }

    #[test]
    fn test_find() {
        let word_list = WordList::new(["cat", "car"]);

        assert_eq!(word_list.find("car"), Some(1));
        assert_eq!(word_list.find(" CAT "), Some(0));
        assert_eq!(word_list.find("cow"), None);
        assert_eq!(word_list.find(""), None);
    }
}
