//! Reading sources for the agent loop.

use envelope::{AcceptedRange, ScalarReading};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of scalar readings for the agent loop.
///
/// The default implementation simulates a sensor; a hardware-backed source
/// plugs in behind the same trait.
pub trait ReadingSource: Send {
    /// Produce the next reading.
    fn next_reading(&mut self) -> ScalarReading;
}

/// Simulated sensor drawing uniform readings from a configured range.
///
/// Values are drawn directly in tenths, so every reading is exactly
/// representable in the packet's one-decimal format.
pub struct RandomSource {
    rng: StdRng,
    range: AcceptedRange,
}

impl RandomSource {
    /// Create a source seeded from the operating system.
    pub fn new(range: AcceptedRange) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range,
        }
    }
}

impl ReadingSource for RandomSource {
    fn next_reading(&mut self) -> ScalarReading {
        let tenths = self
            .rng
            .gen_range(self.range.min().tenths()..=self.range.max().tenths());
        ScalarReading::from_tenths(tenths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min_tenths: i32, max_tenths: i32) -> AcceptedRange {
        AcceptedRange::new(
            ScalarReading::from_tenths(min_tenths),
            ScalarReading::from_tenths(max_tenths),
        )
        .unwrap()
    }

    #[test]
    fn readings_stay_within_range() {
        let range = range(150, 350);
        let mut source = RandomSource::new(range);
        for _ in 0..1_000 {
            let value = source.next_reading();
            assert!(range.contains(value), "out of range: {value}");
        }
    }

    #[test]
    fn degenerate_range_yields_constant_reading() {
        let mut source = RandomSource::new(range(243, 243));
        for _ in 0..10 {
            assert_eq!(source.next_reading(), ScalarReading::from_tenths(243));
        }
    }

    #[test]
    fn negative_ranges_are_supported() {
        let range = range(-500, -100);
        let mut source = RandomSource::new(range);
        for _ in 0..100 {
            assert!(range.contains(source.next_reading()));
        }
    }
}
