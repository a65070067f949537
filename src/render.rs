//! Ring renderer.
//!
//! Walks a Gray sequence once per bit plane, merges contiguous runs of
//! set bits into single annular arc segments, and issues draw calls
//! against an abstract [`Surface`]. Coordinates handed to the surface are
//! diagram-space: the origin sits at the ring center and angles grow
//! counter-clockwise, in degrees.

use crate::config::RingConfig;
use crate::Color;

/// Drawing capability the renderer draws into.
///
/// The renderer never touches color state itself; callers set fill and
/// stroke colors before invoking [`render`].
pub trait Surface {
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);

    /// Fills the annulus segment between `radius` and `radius + width`
    /// spanning `sweep_deg` degrees counter-clockwise from `start_deg`.
    fn fill_arc_segment(&mut self, radius: f64, width: f64, start_deg: f64, sweep_deg: f64);

    /// Strokes a circle of `radius` centered on the diagram origin.
    fn stroke_circle(&mut self, radius: f64);

    /// Strokes a line between two diagram-space points.
    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64);
}

/// A maximal run of consecutive on-sectors within one track, possibly
/// wrapping the 0/last-sector boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub len: usize,
}

/// Merges the on-sectors of bit plane `track` into maximal cyclic runs.
///
/// The scan makes exactly one lap around the sector ring, anchored just
/// past an off-sector so that a run wrapping the boundary still closes
/// within the lap. An all-on plane degenerates to one full-circle run.
pub fn merge_track_runs(sequence: &[u32], track: u32) -> Vec<Run> {
    let count = sequence.len();
    let mask = 1u32 << track;
    let on = |sector: usize| sequence[sector] & mask != 0;

    if count == 0 {
        return Vec::new();
    }
    if (0..count).all(on) {
        return vec![Run {
            start: 0,
            len: count,
        }];
    }

    // Some sector is off, so anchoring there guarantees the first visited
    // sector has an off predecessor and every run closes before the lap
    // ends.
    let anchor = match (0..count).position(|sector| !on(sector)) {
        Some(sector) => sector,
        None => unreachable!("all-on plane handled above"),
    };

    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut steps = 0usize;

    for offset in 1..=count {
        steps += 1;
        // A correct scan is one lap; the cap only trips if the wraparound
        // arithmetic regresses, and in release it truncates instead of
        // looping.
        debug_assert!(steps <= 2 * count, "run merge scanned past one lap");
        if steps > 2 * count {
            break;
        }

        let sector = (anchor + offset) % count;
        match (run_start, on(sector)) {
            (None, true) => run_start = Some(sector),
            (Some(start), false) => {
                runs.push(Run {
                    start,
                    len: (sector + count - start) % count,
                });
                run_start = None;
            }
            _ => {}
        }
    }

    // The lap ends back on the anchor, an off-sector, closing any run.
    debug_assert!(run_start.is_none());
    runs
}

/// Renders `sequence` as a race-track diagram onto `surface`.
///
/// One filled arc per merged run per track, then the optional
/// instrumentation overlay: a stroked circle at each track boundary and a
/// stroked radial line at each sector boundary.
pub fn render(sequence: &[u32], config: &RingConfig, surface: &mut dyn Surface) {
    debug_assert_eq!(sequence.len(), config.segment_count());

    let step_angle = config.step_angle();
    let track_width = config.track_width();

    for track in 0..config.bit_count() {
        let radius = config.track_radius(track);
        for run in merge_track_runs(sequence, track) {
            surface.fill_arc_segment(
                radius,
                track_width,
                run.start as f64 * step_angle,
                run.len as f64 * step_angle,
            );
        }
    }

    if !config.instrumentation() {
        return;
    }

    for boundary in 0..=config.bit_count() {
        surface.stroke_circle(config.inner_radius() + track_width * boundary as f64);
    }

    for sector in 0..config.segment_count() {
        let radians = (sector as f64 * step_angle).to_radians();
        let (sin, cos) = radians.sin_cos();
        surface.stroke_line(
            config.inner_radius() * cos,
            config.inner_radius() * sin,
            config.outer_radius() * cos,
            config.outer_radius() * sin,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gray;

    #[derive(Debug, Default)]
    struct RecordingSurface {
        arcs: Vec<(f64, f64, f64, f64)>,
        circles: Vec<f64>,
        lines: Vec<(f64, f64, f64, f64)>,
    }

    impl Surface for RecordingSurface {
        fn set_fill_color(&mut self, _color: Color) {}
        fn set_stroke_color(&mut self, _color: Color) {}

        fn fill_arc_segment(&mut self, radius: f64, width: f64, start_deg: f64, sweep_deg: f64) {
            self.arcs.push((radius, width, start_deg, sweep_deg));
        }

        fn stroke_circle(&mut self, radius: f64) {
            self.circles.push(radius);
        }

        fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
            self.lines.push((x0, y0, x1, y1));
        }
    }

    #[test]
    fn two_bit_tracks_merge_to_one_run_each() {
        let sequence = gray::generate(2).unwrap();
        // LSB on at sectors 1 and 2, MSB at 2 and 3.
        assert_eq!(merge_track_runs(&sequence, 0), vec![Run { start: 1, len: 2 }]);
        assert_eq!(merge_track_runs(&sequence, 1), vec![Run { start: 2, len: 2 }]);
    }

    #[test]
    fn run_wrapping_the_sector_boundary_stays_merged() {
        // Bit 0 on at sectors 7, 0 and 1 of 8.
        let sequence = [1, 1, 0, 0, 0, 0, 0, 1];
        assert_eq!(merge_track_runs(&sequence, 0), vec![Run { start: 7, len: 3 }]);
    }

    #[test]
    fn all_on_plane_becomes_one_full_circle_run() {
        let sequence = [1u32; 4];
        assert_eq!(merge_track_runs(&sequence, 0), vec![Run { start: 0, len: 4 }]);
    }

    #[test]
    fn all_off_plane_emits_nothing() {
        let sequence = [0u32; 8];
        assert!(merge_track_runs(&sequence, 0).is_empty());
    }

    #[test]
    fn alternating_plane_splits_into_singleton_runs() {
        let sequence = [1, 0, 1, 0, 1, 0];
        let runs = merge_track_runs(&sequence, 0);
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|run| run.len == 1));
    }

    #[test]
    fn two_bit_scenario_emits_one_arc_per_track() {
        let sequence = gray::generate(2).unwrap();
        let config = RingConfig::new(2, 100.0, 200.0, false, false);
        let mut surface = RecordingSurface::default();
        render(&sequence, &config, &mut surface);

        assert_eq!(
            surface.arcs,
            vec![
                // track 0: sectors 1..3 at the outer band
                (150.0, 50.0, 90.0, 180.0),
                // track 1: sectors 2..4 at the inner band
                (100.0, 50.0, 180.0, 180.0),
            ]
        );
        assert!(surface.circles.is_empty());
        assert!(surface.lines.is_empty());
    }

    #[test]
    fn instrumentation_overlay_counts() {
        let sequence = gray::generate(3).unwrap();
        let config = RingConfig::new(3, 90.0, 180.0, false, true);
        let mut surface = RecordingSurface::default();
        render(&sequence, &config, &mut surface);

        assert_eq!(surface.circles, vec![90.0, 120.0, 150.0, 180.0]);
        assert_eq!(surface.lines.len(), 8);

        // Sector boundary 0 runs along the positive x axis.
        let (x0, y0, x1, y1) = surface.lines[0];
        assert!((x0 - 90.0).abs() < 1e-9 && y0.abs() < 1e-9);
        assert!((x1 - 180.0).abs() < 1e-9 && y1.abs() < 1e-9);
    }

    #[test]
    fn inverted_order_swaps_track_radii() {
        let sequence = gray::generate(2).unwrap();
        let config = RingConfig::new(2, 100.0, 200.0, true, false);
        let mut surface = RecordingSurface::default();
        render(&sequence, &config, &mut surface);

        assert_eq!(surface.arcs[0].0, 100.0);
        assert_eq!(surface.arcs[1].0, 150.0);
    }
}
