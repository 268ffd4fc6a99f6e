//! Core storage model: a flat, word-addressed memory image.
//!
//! The machine addresses 16-bit words, not bytes. Reads and writes wrap
//! modulo the installed storage size and never fault; address overflow is
//! architecturally defined as wraparound.

/// Installed core storage sizes supported by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemorySize {
    /// 4,096 words.
    Words4K,
    /// 8,192 words.
    Words8K,
    /// 16,384 words.
    Words16K,
    /// 32,768 words, the full 15-bit address space.
    #[default]
    Words32K,
}

impl MemorySize {
    /// Number of addressable words for this storage size.
    #[must_use]
    pub const fn word_count(self) -> usize {
        match self {
            Self::Words4K => 4 * 1024,
            Self::Words8K => 8 * 1024,
            Self::Words16K => 16 * 1024,
            Self::Words32K => 32 * 1024,
        }
    }

    /// Address mask applied to every access. Storage sizes are powers of
    /// two, so wrapping is a bitwise and.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn address_mask(self) -> u16 {
        (self.word_count() - 1) as u16
    }
}

/// Flat word-addressed core storage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Memory {
    words: Vec<u16>,
    mask: u16,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(MemorySize::default())
    }
}

impl Memory {
    /// Allocates zeroed storage of the given size.
    #[must_use]
    pub fn new(size: MemorySize) -> Self {
        Self {
            words: vec![0; size.word_count()],
            mask: size.address_mask(),
        }
    }

    /// Number of installed words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when no storage is installed. Kept for container-API symmetry;
    /// every constructor installs at least 4K words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Address mask for this storage size.
    #[must_use]
    pub const fn address_mask(&self) -> u16 {
        self.mask
    }

    /// Reads the word at `addr`, wrapping modulo the storage size.
    #[must_use]
    pub fn read(&self, addr: u16) -> u16 {
        self.words[usize::from(addr & self.mask)]
    }

    /// Writes the word at `addr`, wrapping modulo the storage size.
    pub fn write(&mut self, addr: u16, value: u16) {
        let idx = usize::from(addr & self.mask);
        self.words[idx] = value;
    }

    /// Copies an assembled image into storage starting at `origin`.
    /// Successive words wrap modulo the storage size like any other write.
    pub fn load(&mut self, origin: u16, image: &[u16]) {
        for (offset, &word) in image.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let addr = origin.wrapping_add(offset as u16);
            self.write(addr, word);
        }
    }

    /// Read-only view of the full word image.
    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}
