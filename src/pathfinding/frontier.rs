use super::astar::SearchScratch;

/// Binary min-heap over cell indices, ordered by (f ascending, then h
/// ascending). The tie-break on h biases expansion toward the goal when
/// total costs are equal, which cuts expansion count without affecting
/// optimality.
///
/// All cost data lives in the search scratch arrays; the heap only stores
/// cell indices and keeps each open cell's slot index up to date so a
/// cheaper route can lower its key in place instead of re-inserting.
/// Membership is a per-cell run stamp set on push and cleared on pop, never
/// inferred from slot contents, so a cell extracted earlier can not alias
/// whatever later lands on its old slot.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: Vec<u32>,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, scratch: &SearchScratch, cell: u32) -> bool {
        scratch.is_open(cell)
    }

    /// Insert a cell whose g/h are already written to the scratch. O(log n).
    pub fn push(&mut self, scratch: &mut SearchScratch, cell: u32) {
        let slot = self.heap.len();
        self.heap.push(cell);
        scratch.mark_open(cell, slot);
        self.sift_up(scratch, slot);
    }

    /// Extract the cell with the lowest (f, h). O(log n).
    pub fn pop(&mut self, scratch: &mut SearchScratch) -> Option<u32> {
        let min = *self.heap.first()?;
        scratch.clear_open(min);

        let last = self.heap.pop()?;
        if !self.heap.is_empty() {
            self.heap[0] = last;
            scratch.set_slot(last, 0);
            self.sift_down(scratch, 0);
        }
        Some(min)
    }

    /// Restore heap order after the caller lowered an open cell's g-cost.
    /// All cost lowering must come through here; mutating scratch costs
    /// without it breaks the slot-index invariant.
    pub fn decrease_key(&mut self, scratch: &mut SearchScratch, cell: u32) {
        debug_assert!(scratch.is_open(cell));
        let slot = scratch.slot(cell);
        debug_assert_eq!(self.heap[slot], cell);
        self.sift_up(scratch, slot);
    }

    fn less(scratch: &SearchScratch, a: u32, b: u32) -> bool {
        (scratch.f(a), scratch.h(a)) < (scratch.f(b), scratch.h(b))
    }

    fn swap(&mut self, scratch: &mut SearchScratch, a: usize, b: usize) {
        self.heap.swap(a, b);
        scratch.set_slot(self.heap[a], a);
        scratch.set_slot(self.heap[b], b);
    }

    fn sift_up(&mut self, scratch: &mut SearchScratch, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !Self::less(scratch, self.heap[slot], self.heap[parent]) {
                break;
            }
            self.swap(scratch, slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, scratch: &mut SearchScratch, mut slot: usize) {
        loop {
            let left = slot * 2 + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let mut smallest = left;
            if right < self.heap.len() && Self::less(scratch, self.heap[right], self.heap[left]) {
                smallest = right;
            }
            if !Self::less(scratch, self.heap[smallest], self.heap[slot]) {
                break;
            }
            self.swap(scratch, slot, smallest);
            slot = smallest;
        }
    }
}
