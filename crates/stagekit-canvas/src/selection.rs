//! Selection bookkeeping: which shape ids are selected, in insertion
//! order.
//!
//! The selection stores ids only. Everything geometric about it, the
//! union bounding box included, is derived from current shape geometry at
//! the moment it is needed, so it can never go stale while members move.

use stagekit_core::Bounds;

/// An ordered set of selected shape ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<u64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// True when exactly one shape is selected.
    pub fn is_single(&self) -> bool {
        self.ids.len() == 1
    }

    /// Replaces the selection with a single id.
    pub fn select(&mut self, id: u64) -> bool {
        if self.ids.as_slice() == [id] {
            return false;
        }
        self.ids.clear();
        self.ids.push(id);
        true
    }

    /// Adds or removes one id, as shift-click does. Returns whether the
    /// selection changed.
    pub fn toggle(&mut self, id: u64) -> bool {
        match self.ids.iter().position(|&s| s == id) {
            Some(pos) => {
                self.ids.remove(pos);
            }
            None => self.ids.push(id),
        }
        true
    }

    /// Replaces the selection with every id whose bounds intersect the
    /// marquee rectangle.
    pub fn select_in_rect<'a>(
        &mut self,
        marquee: &Bounds,
        candidates: impl IntoIterator<Item = (u64, &'a Bounds)>,
    ) -> bool {
        let hits: Vec<u64> = candidates
            .into_iter()
            .filter(|(_, b)| marquee.intersects(b))
            .map(|(id, _)| id)
            .collect();
        if hits == self.ids {
            return false;
        }
        self.ids = hits;
        true
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = u64>) -> bool {
        let all: Vec<u64> = ids.into_iter().collect();
        if all == self.ids {
            return false;
        }
        self.ids = all;
        true
    }

    /// Drops one id if present, keeping the rest selected.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.ids.iter().position(|&s| s == id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }
}
