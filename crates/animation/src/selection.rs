/// Deterministic keyframe selection backed by a bitset.
///
/// Membership is tracked by keyframe index.
///
/// Ordering contract:
/// - Iteration yields indices in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    words: Vec<u64>,
    len: usize,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        let (word, bit) = word_bit(index);
        self.words
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// Returns `true` if the set changed.
    pub fn insert(&mut self, index: usize) -> bool {
        self.ensure_capacity(index);
        let (word, bit) = word_bit(index);
        let mask = 1u64 << bit;
        let w = &mut self.words[word];
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        self.len += 1;
        true
    }

    /// Returns `true` if the set changed.
    pub fn remove(&mut self, index: usize) -> bool {
        let (word, bit) = word_bit(index);
        let Some(w) = self.words.get_mut(word) else {
            return false;
        };
        let mask = 1u64 << bit;
        if (*w & mask) == 0 {
            return false;
        }
        *w &= !mask;
        self.len -= 1;
        true
    }

    /// Iterates selected indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        SelectionIndexIter {
            words: &self.words,
            word_index: 0,
            current_word: 0,
            base_index: 0,
        }
    }

    /// Follows keyframes through a reorder: `new_index_of[old] == new`.
    ///
    /// Old indices without a mapping are dropped.
    pub fn remap(&self, new_index_of: &[usize]) -> Self {
        let mut out = Self::new();
        for old in self.iter() {
            if let Some(&new) = new_index_of.get(old) {
                out.insert(new);
            }
        }
        out
    }

    /// Drops `index` and shifts every higher index down by one, matching a
    /// `Vec::remove` on the underlying keyframes.
    pub fn remove_and_shift(&mut self, index: usize) {
        let shifted: Vec<usize> = self
            .iter()
            .filter(|&i| i != index)
            .map(|i| if i > index { i - 1 } else { i })
            .collect();
        self.clear();
        for i in shifted {
            self.insert(i);
        }
    }

    fn ensure_capacity(&mut self, index: usize) {
        let (word, _bit) = word_bit(index);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
    }
}

fn word_bit(index: usize) -> (usize, u32) {
    (index / 64, (index % 64) as u32)
}

struct SelectionIndexIter<'a> {
    words: &'a [u64],
    word_index: usize,
    current_word: u64,
    base_index: usize,
}

impl Iterator for SelectionIndexIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let tz = self.current_word.trailing_zeros();
                self.current_word &= !(1u64 << tz);
                return Some(self.base_index + tz as usize);
            }

            let w = *self.words.get(self.word_index)?;
            self.current_word = w;
            self.base_index = self.word_index * 64;
            self.word_index += 1;
        }
    }
}
