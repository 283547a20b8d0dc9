//! Per-search bookkeeping keyed by tile index.

/// Visited marks, costs, and ancestors for one search at a time.
///
/// Searches reset every entry they touched before returning, so one scratch can be reused
/// across any number of searches over grids of the same size.
#[derive(Clone, Debug, Default)]
pub struct SearchScratch {
    visited: Vec<bool>,
    cost: Vec<u32>,
    ancestor: Vec<Option<usize>>,
    touched: Vec<usize>,
}

impl SearchScratch {
    pub fn new(len: usize) -> Self {
        let mut scratch = Self::default();
        scratch.prepare(len);
        scratch
    }

    /// Grows the buffers to cover `len` tiles.
    pub(super) fn prepare(&mut self, len: usize) {
        if self.visited.len() < len {
            self.visited.resize(len, false);
            self.cost.resize(len, 0);
            self.ancestor.resize(len, None);
        }
    }

    /// Marks `index` visited. Returns false if it already was.
    pub(super) fn visit(&mut self, index: usize, cost: u32, ancestor: Option<usize>) -> bool {
        if self.visited[index] {
            return false;
        }
        self.visited[index] = true;
        self.cost[index] = cost;
        self.ancestor[index] = ancestor;
        self.touched.push(index);
        true
    }

    pub(super) fn is_visited(&self, index: usize) -> bool {
        self.visited[index]
    }

    pub(super) fn cost(&self, index: usize) -> u32 {
        self.cost[index]
    }

    pub(super) fn ancestor(&self, index: usize) -> Option<usize> {
        self.ancestor[index]
    }

    pub(super) fn reset(&mut self) {
        for index in self.touched.drain(..) {
            self.visited[index] = false;
            self.cost[index] = 0;
            self.ancestor[index] = None;
        }
    }

    /// True when no search marks are left behind.
    pub fn is_clean(&self) -> bool {
        self.touched.is_empty()
            && !self.visited.iter().any(|&visited| visited)
            && self.ancestor.iter().all(Option::is_none)
    }
}
