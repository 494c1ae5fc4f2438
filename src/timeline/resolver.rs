use crate::foundation::core::EndOfLife;

/// Timing window of one item, in 10 ms units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemTiming {
    /// Output time at which the item starts playing.
    pub start: u32,
    /// Length of the item's assigned window.
    pub duration: u32,
    pub end_of_life: EndOfLife,
}

impl ItemTiming {
    pub fn end(self) -> u64 {
        u64::from(self.start) + u64::from(self.duration)
    }
}

/// Per-item playback cursor, advanced monotonically over output ticks.
#[derive(Clone, Debug)]
pub struct TimelineCursor {
    timing: ItemTiming,
    delays: Vec<u32>,
    effective_count: usize,
    frame_index: usize,
    elapsed: u64,
}

impl TimelineCursor {
    /// `delays` holds the source's per-frame delays in frame order.
    pub fn new(timing: ItemTiming, delays: Vec<u32>) -> Self {
        let effective_count = effective_frame_count(&delays, timing);
        let elapsed = delays.first().copied().map(u64::from).unwrap_or(0);
        Self {
            timing,
            delays,
            effective_count,
            frame_index: 0,
            elapsed,
        }
    }

    pub fn timing(&self) -> ItemTiming {
        self.timing
    }

    pub fn effective_count(&self) -> usize {
        self.effective_count
    }

    /// Source frame to show at output time `t`, or `None` when the item
    /// contributes nothing. Calls must use non-decreasing `t`.
    pub fn resolve(&mut self, t: u32) -> Option<usize> {
        if self.delays.is_empty() || t < self.timing.start {
            return None;
        }

        let local = u64::from(t - self.timing.start);
        let window = u64::from(self.timing.duration);
        let expired = local >= window;

        if expired && self.timing.end_of_life == EndOfLife::Hidden {
            return None;
        }

        if local <= window || self.timing.end_of_life == EndOfLife::Loop {
            self.advance_to(local);
        }

        Some(self.frame_index)
    }

    fn advance_to(&mut self, local: u64) {
        while local > self.elapsed {
            let mut next = self.frame_index + 1;
            if next >= self.effective_count {
                if self.timing.end_of_life != EndOfLife::Loop {
                    break;
                }
                next = 0;
            }
            self.frame_index = next;
            self.elapsed += u64::from(self.delays[next].max(1));
        }
    }
}

/// Frames that take part in playback.
///
/// A looping item cycles over the shortest prefix of frames whose delays
/// cover its duration; other items may use every frame.
pub fn effective_frame_count(delays: &[u32], timing: ItemTiming) -> usize {
    if timing.end_of_life != EndOfLife::Loop {
        return delays.len();
    }

    let mut covered = 0u64;
    for (i, &d) in delays.iter().enumerate() {
        covered += u64::from(d);
        if covered >= u64::from(timing.duration) {
            return i + 1;
        }
    }
    delays.len()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolver.rs"]
mod tests;
