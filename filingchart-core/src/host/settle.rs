//! Post-fit settle retries.

use std::fmt;
use std::time::{Duration, Instant};

/// Identity of one constructed chart instance within a host.
///
/// Every rebuild gets a fresh generation; a retry carrying an older one
/// belongs to a torn-down chart and is skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartGeneration(pub u64);

impl ChartGeneration {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ChartGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Pending reposition retries, ordered by due time.
#[derive(Debug, Clone, Default)]
pub struct SettleQueue {
    pending: Vec<(Instant, ChartGeneration)>,
}

impl SettleQueue {
    pub fn schedule(
        &mut self,
        generation: ChartGeneration,
        now: Instant,
        delays: impl IntoIterator<Item = Duration>,
    ) {
        self.pending
            .extend(delays.into_iter().map(|d| (now + d, generation)));
        self.pending.sort_by_key(|(due, _)| *due);
    }

    /// Remove and return the generations of every retry due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<ChartGeneration> {
        let split = self.pending.partition_point(|(due, _)| *due <= now);
        self.pending.drain(..split).map(|(_, g)| g).collect()
    }

    /// Drop the remaining retries for `generation`.
    pub fn cancel(&mut self, generation: ChartGeneration) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(_, g)| *g != generation);
        before - self.pending.len()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.first().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn retries_come_due_in_order() {
        let t0 = Instant::now();
        let mut q = SettleQueue::default();
        q.schedule(ChartGeneration(1), t0, [ms(50), ms(200)]);
        assert!(q.take_due(t0 + ms(10)).is_empty());
        assert_eq!(q.take_due(t0 + ms(50)), vec![ChartGeneration(1)]);
        assert_eq!(q.next_due(), Some(t0 + ms(200)));
        assert_eq!(q.take_due(t0 + ms(500)), vec![ChartGeneration(1)]);
        assert!(q.is_empty());
    }

    #[test]
    fn interleaved_generations_stay_sorted() {
        let t0 = Instant::now();
        let mut q = SettleQueue::default();
        q.schedule(ChartGeneration(1), t0, [ms(50), ms(200)]);
        q.schedule(ChartGeneration(2), t0 + ms(100), [ms(50), ms(200)]);
        let due = q.take_due(t0 + ms(250));
        assert_eq!(
            due,
            vec![ChartGeneration(1), ChartGeneration(2), ChartGeneration(1)]
        );
    }

    #[test]
    fn cancel_drops_only_that_generation() {
        let t0 = Instant::now();
        let mut q = SettleQueue::default();
        q.schedule(ChartGeneration(1), t0, [ms(50), ms(200)]);
        q.schedule(ChartGeneration(2), t0, [ms(50)]);
        assert_eq!(q.cancel(ChartGeneration(1)), 2);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn generation_display_and_next() {
        assert_eq!(ChartGeneration(4).next(), ChartGeneration(5));
        assert_eq!(ChartGeneration(4).to_string(), "gen-4");
    }
}
