//! Ring geometry configuration.
//!
//! Holds the numeric parameters of the encoder disc and derives the
//! per-track geometry from them. Setters clamp rather than fail so the
//! render path never sees an invalid combination.

use crate::gray::MAX_BIT_COUNT;

/// Geometry of the encoder disc: bit count, radial band, track order.
#[derive(Debug, Clone, PartialEq)]
pub struct RingConfig {
    bit_count: u32,
    inner_radius: f64,
    outer_radius: f64,
    invert_tracks: bool,
    instrumentation: bool,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            bit_count: 2,
            inner_radius: 100.0,
            outer_radius: 150.0,
            invert_tracks: false,
            instrumentation: false,
        }
    }
}

impl RingConfig {
    pub fn new(
        bit_count: u32,
        inner_radius: f64,
        outer_radius: f64,
        invert_tracks: bool,
        instrumentation: bool,
    ) -> Self {
        // Start from the smallest valid band so the clamping setters see
        // no stale values.
        let mut config = Self {
            bit_count: 1,
            inner_radius: 0.0,
            outer_radius: 1.0,
            invert_tracks,
            instrumentation,
        };
        config.set_bit_count(bit_count);
        config.set_outer_radius(outer_radius);
        config.set_inner_radius(inner_radius);
        config
    }

    /// Sets the bit count, clamped to `1..=31`. Returns true when the
    /// stored value changed, so the owner can invalidate its cached
    /// sequence.
    pub fn set_bit_count(&mut self, bit_count: u32) -> bool {
        let clamped = bit_count.clamp(1, MAX_BIT_COUNT);
        let changed = clamped != self.bit_count;
        self.bit_count = clamped;
        changed
    }

    /// Sets the inner radius, clamped to `[0, outer_radius - 1]`.
    pub fn set_inner_radius(&mut self, radius: f64) {
        self.inner_radius = radius.clamp(0.0, self.outer_radius - 1.0);
    }

    /// Sets the outer radius, clamped to at least `inner_radius + 1`.
    pub fn set_outer_radius(&mut self, radius: f64) {
        self.outer_radius = radius.max(self.inner_radius + 1.0);
    }

    pub fn set_invert_tracks(&mut self, invert: bool) {
        self.invert_tracks = invert;
    }

    pub fn set_instrumentation(&mut self, enabled: bool) {
        self.instrumentation = enabled;
    }

    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn invert_tracks(&self) -> bool {
        self.invert_tracks
    }

    pub fn instrumentation(&self) -> bool {
        self.instrumentation
    }

    /// Number of angular sectors, one per sequence index.
    pub fn segment_count(&self) -> usize {
        1usize << self.bit_count
    }

    /// Angular width of one sector, in degrees.
    pub fn step_angle(&self) -> f64 {
        360.0 / self.segment_count() as f64
    }

    /// Radial width of one track.
    pub fn track_width(&self) -> f64 {
        (self.outer_radius - self.inner_radius) / self.bit_count as f64
    }

    /// Inner radius of track `t`. Track 0 is the outermost band unless
    /// the order is inverted.
    pub fn track_radius(&self, track: u32) -> f64 {
        let width = self.track_width();
        if self.invert_tracks {
            self.inner_radius + width * track as f64
        } else {
            self.outer_radius - width * (track + 1) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_count_is_clamped_to_supported_range() {
        let mut config = RingConfig::default();
        assert!(config.set_bit_count(0));
        assert_eq!(config.bit_count(), 1);
        assert!(config.set_bit_count(40));
        assert_eq!(config.bit_count(), 31);
        assert!(!config.set_bit_count(31));
    }

    #[test]
    fn set_bit_count_reports_change() {
        let mut config = RingConfig::default();
        assert!(config.set_bit_count(5));
        assert!(!config.set_bit_count(5));
    }

    #[test]
    fn outer_radius_clamps_against_inner() {
        let mut config = RingConfig::default();
        config.set_inner_radius(100.0);
        config.set_outer_radius(50.0);
        assert_eq!(config.outer_radius(), 101.0);
    }

    #[test]
    fn inner_radius_clamps_against_outer() {
        let mut config = RingConfig::default();
        config.set_outer_radius(150.0);
        config.set_inner_radius(500.0);
        assert_eq!(config.inner_radius(), 149.0);
        config.set_inner_radius(-20.0);
        assert_eq!(config.inner_radius(), 0.0);
    }

    #[test]
    fn derived_geometry() {
        let config = RingConfig::new(2, 100.0, 200.0, false, false);
        assert_eq!(config.segment_count(), 4);
        assert_eq!(config.step_angle(), 90.0);
        assert_eq!(config.track_width(), 50.0);
        assert_eq!(config.track_radius(0), 150.0);
        assert_eq!(config.track_radius(1), 100.0);
    }

    #[test]
    fn inverted_track_order_mirrors_the_bands() {
        let config = RingConfig::new(2, 100.0, 200.0, true, false);
        assert_eq!(config.track_radius(0), 100.0);
        assert_eq!(config.track_radius(1), 150.0);
    }
}
