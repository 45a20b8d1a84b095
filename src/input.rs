//! Pointer/touch sampling
//!
//! Event handlers write the newest pointer position; the game loop reads it
//! once per tick. Older samples are simply overwritten.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

const EMPTY: u64 = u64::MAX;

/// Latest-value pointer slot, shareable between input handlers and the loop
#[derive(Debug, Clone)]
pub struct PointerSlot {
    packed: Arc<AtomicU64>,
}

impl Default for PointerSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerSlot {
    pub fn new() -> Self {
        Self {
            packed: Arc::new(AtomicU64::new(EMPTY)),
        }
    }

    /// Store a field-local pointer position. Non-finite samples are dropped.
    pub fn write(&self, pos: Vec2) {
        if !pos.is_finite() {
            return;
        }
        let packed = ((pos.x.to_bits() as u64) << 32) | pos.y.to_bits() as u64;
        self.packed.store(packed, Ordering::Release);
    }

    /// Most recent sample, if any was written since the last clear
    pub fn latest(&self) -> Option<Vec2> {
        let packed = self.packed.load(Ordering::Acquire);
        if packed == EMPTY {
            return None;
        }
        let x = f32::from_bits((packed >> 32) as u32);
        let y = f32::from_bits(packed as u32);
        Some(Vec2::new(x, y))
    }

    pub fn clear(&self) {
        self.packed.store(EMPTY, Ordering::Release);
    }
}

/// Convert client (page) coordinates to field-local coordinates
///
/// `origin` is the field's top-left corner in client space.
pub fn client_to_field(client: Vec2, origin: Vec2) -> Vec2 {
    client - origin
}
