use std::collections::VecDeque;

use geoworld_world::ChunkKey;
use hashbrown::HashMap;

pub struct Task<T> {
    pub id: u64,
    pub chunk: ChunkKey,
    pub payload: T,
}

/// FIFO of per-chunk work drained a fixed number of tasks per tick.
///
/// Tasks are tagged with the chunk that queued them so an unload can drop
/// everything still pending for it.
pub struct BudgetQueue<T> {
    tasks: VecDeque<Task<T>>,
    pending: HashMap<ChunkKey, usize>,
    next_id: u64,
}

impl<T> Default for BudgetQueue<T> {
    fn default() -> Self {
        Self {
            tasks: VecDeque::new(),
            pending: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T> BudgetQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn push(&mut self, chunk: ChunkKey, payload: T) -> u64 {
        let id = self.alloc_id();
        self.tasks.push_back(Task { id, chunk, payload });
        *self.pending.entry(chunk).or_insert(0) += 1;
        id
    }

    /// Pop up to `budget` tasks in submission order.
    pub fn drain(&mut self, budget: usize) -> Vec<Task<T>> {
        let n = budget.min(self.tasks.len());
        let out: Vec<Task<T>> = self.tasks.drain(..n).collect();
        for t in &out {
            self.release(t.chunk, 1);
        }
        out
    }

    /// Drop every queued task of `chunk`; returns how many were dropped.
    pub fn drop_chunk(&mut self, chunk: ChunkKey) -> usize {
        let Some(n) = self.pending.remove(&chunk) else {
            return 0;
        };
        self.tasks.retain(|t| t.chunk != chunk);
        n
    }

    fn release(&mut self, chunk: ChunkKey, n: usize) {
        if let Some(c) = self.pending.get_mut(&chunk) {
            *c = c.saturating_sub(n);
            if *c == 0 {
                self.pending.remove(&chunk);
            }
        }
    }

    #[inline]
    pub fn pending_for(&self, chunk: ChunkKey) -> usize {
        self.pending.get(&chunk).copied().unwrap_or(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.pending.clear();
    }
}
