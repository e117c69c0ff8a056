use std::fmt;

/// One of the 26 lowercase letters a word can start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey(u8);

impl PartitionKey {
    pub const COUNT: usize = 26;

    /// Every key, `a` through `z`.
    pub const ALL: [PartitionKey; Self::COUNT] = {
        let mut keys = [PartitionKey(0); Self::COUNT];
        let mut i = 0;
        while i < Self::COUNT {
            keys[i] = PartitionKey(i as u8);
            i += 1;
        }
        keys
    };

    pub fn from_letter(letter: char) -> Option<Self> {
        letter
            .is_ascii_lowercase()
            .then_some(PartitionKey(letter as u8 - b'a'))
    }

    /// Partition owning `word`, decided by its first character only.
    pub fn of(word: &str) -> Option<Self> {
        word.chars().next().and_then(Self::from_letter)
    }

    pub fn letter(self) -> char {
        char::from(b'a' + self.0)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
