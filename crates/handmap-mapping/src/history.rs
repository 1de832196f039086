//! Previous-frame landmark cache shared by every velocity mapping.

use handmap_core::{Handedness, Landmark, LANDMARK_COUNT};

/// One slot per handedness, owned by the orchestrator
#[derive(Debug, Clone, Default)]
pub struct LandmarkHistory {
    slots: [Option<[Landmark; LANDMARK_COUNT]>; 2],
}

impl LandmarkHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handedness: Handedness) -> Option<&[Landmark; LANDMARK_COUNT]> {
        self.slots[handedness.index()].as_ref()
    }

    /// Overwrite the snapshot for one hand
    pub fn store(&mut self, handedness: Handedness, landmarks: [Landmark; LANDMARK_COUNT]) {
        self.slots[handedness.index()] = Some(landmarks);
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
