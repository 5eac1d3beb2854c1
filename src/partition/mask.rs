//! Bitset over group indices.

const WORD: usize = 64;

/// A set of group indices in `0..len`.
///
/// Used to restrict which groups may supply each half of a swap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupMask {
    words: Vec<u64>,
    len: usize,
}

impl GroupMask {
    /// Mask containing every index in `0..len`.
    pub fn full(len: usize) -> Self {
        let mut mask = Self::empty(len);
        mask.fill(true);
        mask
    }

    /// Mask containing no index.
    pub fn empty(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD)],
            len,
        }
    }

    /// Mask containing exactly `indices`.
    pub fn from_indices(len: usize, indices: &[usize]) -> Self {
        let mut mask = Self::empty(len);
        for &i in indices {
            mask.insert(i);
        }
        mask
    }

    /// Size of the universe.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Resizes the universe to `len` and sets every bit to `value`.
    pub fn reset(&mut self, len: usize, value: bool) {
        self.len = len;
        self.words.resize(len.div_ceil(WORD), 0);
        self.fill(value);
    }

    /// Sets every bit to `value`.
    pub fn fill(&mut self, value: bool) {
        let word = if value { u64::MAX } else { 0 };
        self.words.iter_mut().for_each(|w| *w = word);
        let tail = self.len % WORD;
        if value && tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.len && self.words[index / WORD] & (1u64 << (index % WORD)) != 0
    }

    #[inline]
    pub fn insert(&mut self, index: usize) {
        debug_assert!(index < self.len, "group index {index} out of range");
        self.words[index / WORD] |= 1u64 << (index % WORD);
    }

    #[inline]
    pub fn remove(&mut self, index: usize) {
        debug_assert!(index < self.len, "group index {index} out of range");
        self.words[index / WORD] &= !(1u64 << (index % WORD));
    }

    /// Number of indices in the set.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.contains(i))
    }

    /// Members in ascending order, collected into `out` (cleared first).
    pub fn collect_into(&self, out: &mut Vec<usize>) {
        out.clear();
        out.extend(self.iter());
    }
}
