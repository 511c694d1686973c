use std::collections::{HashMap, HashSet};

pub type FrameId = usize;

#[derive(Debug)]
struct ClockNode {
    ref_bit: bool,
    slot: usize,
}

/// Clock (second-chance) approximation of LRU over a bounded set of
/// unpinned frame ids. Holds no knowledge of page contents or disk I/O.
#[derive(Debug)]
pub struct ClockReplacer {
    pool_size: usize,
    ring: Vec<Option<FrameId>>,
    // Present only while a frame is evictable (has a ring slot).
    nodes: HashMap<FrameId, ClockNode>,
    // Sticky: every frame that has ever been `Pin`ned. Distinguishes a
    // frame that has never been used at all from one merely not currently
    // in the ring.
    known: HashSet<FrameId>,
    clock_hand: usize,
    total_frames: usize,
}

impl ClockReplacer {
    pub fn new(pool_size: usize) -> Self {
        ClockReplacer {
            pool_size,
            ring: vec![None; pool_size],
            nodes: HashMap::new(),
            known: HashSet::new(),
            clock_hand: 0,
            total_frames: 0,
        }
    }

    pub fn builder() -> ClockReplacerBuilder {
        ClockReplacerBuilder::default()
    }

    /// Number of frames currently eligible for eviction.
    pub fn size(&self) -> usize {
        self.total_frames
    }

    /// Removes that frame from eviction candidacy and records that it has
    /// now been pinned at least once. Idempotent.
    pub fn pin(&mut self, frame_id: FrameId) {
        log::trace!("pin(frame_id={frame_id})");
        self.known.insert(frame_id);
        if let Some(node) = self.nodes.remove(&frame_id) {
            self.ring[node.slot] = None;
            self.total_frames -= 1;
        }
    }

    /// Adds a previously-pinned frame to eviction candidacy with
    /// ref_bit=1. No-op if the replacer is at capacity, if the frame was
    /// never pinned, or if it is already evictable.
    pub fn unpin(&mut self, frame_id: FrameId) {
        log::trace!("unpin(frame_id={frame_id})");
        if !self.known.contains(&frame_id) {
            return;
        }
        if self.total_frames == self.pool_size {
            return;
        }
        if self.nodes.contains_key(&frame_id) {
            return;
        }
        let mut slot = self.clock_hand;
        while self.ring[slot].is_some() {
            slot = (slot + 1) % self.pool_size;
        }
        self.ring[slot] = Some(frame_id);
        self.nodes.insert(frame_id, ClockNode { ref_bit: true, slot });
        if slot == self.clock_hand {
            self.clock_hand = (self.clock_hand + 1) % self.pool_size;
        }
        self.total_frames += 1;
    }

    /// Selects a victim using the Clock sweep described in SPEC_FULL.md
    /// §4.1: the hand clears ref bits as it passes and keeps advancing
    /// (rather than stopping after one lap), so the first slot whose bit
    /// is already 0 when the hand reaches it a second time is evicted.
    /// This is a deterministic function of the replacer's current state.
    pub fn victim(&mut self) -> Option<FrameId> {
        if self.total_frames == 0 {
            return None;
        }
        loop {
            let slot = self.clock_hand;
            let Some(frame_id) = self.ring[slot] else {
                self.clock_hand = (self.clock_hand + 1) % self.pool_size;
                continue;
            };
            let ref_bit = self.nodes.get(&frame_id).map(|n| n.ref_bit).unwrap_or(false);
            if !ref_bit {
                self.ring[slot] = None;
                self.nodes.remove(&frame_id);
                self.total_frames -= 1;
                self.clock_hand = (slot + 1) % self.pool_size;
                log::trace!("victim() selected frame_id={frame_id}");
                return Some(frame_id);
            }
            self.nodes.get_mut(&frame_id).unwrap().ref_bit = false;
            self.clock_hand = (self.clock_hand + 1) % self.pool_size;
        }
    }
}

#[derive(Default)]
pub struct ClockReplacerBuilder {
    pool_size: Option<usize>,
}

impl ClockReplacerBuilder {
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        assert!(pool_size > 0);
        self.pool_size = Some(pool_size);
        self
    }

    pub fn build(self) -> ClockReplacer {
        ClockReplacer::new(
            self.pool_size
                .expect("`pool_size` not initialized before build."),
        )
    }
}

#[path = "tests.rs"]
#[cfg(test)]
mod tests;
