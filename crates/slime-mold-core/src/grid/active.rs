use crate::cell::Position;

/// Growth-only record of positions that may change state in a later step.
///
/// The listing keeps first-marked order and is only emptied by `clear`, so a
/// borrowed snapshot stays valid until the next mutation.
#[derive(Clone, Debug, Default)]
pub struct ActiveRecord {
    flags: Vec<bool>,
    listing: Vec<Position>,
}

impl ActiveRecord {
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
            listing: Vec::new(),
        }
    }

    /// Flags `position` (stored at `index`). Returns whether it was new.
    pub fn mark(&mut self, index: usize, position: Position) -> bool {
        if self.flags[index] {
            return false;
        }
        self.flags[index] = true;
        self.listing.push(position);
        true
    }

    pub fn contains(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    pub fn positions(&self) -> &[Position] {
        &self.listing
    }

    pub fn len(&self) -> usize {
        self.listing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listing.is_empty()
    }

    pub fn clear(&mut self) {
        self.flags.fill(false);
        self.listing.clear();
    }
}
