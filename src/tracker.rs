//! Distance tracking core.
//!
//! For each frame: heliocentric positions, planar distances from Earth,
//! closest-planet selection, and the running statistics behind the table
//! and pie chart.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::celestial::Body;
use crate::ephem::{self, SpiceKernel};

/// Per-frame position lookup, barycentric in AU. The tracker treats this as
/// a pure function of (body, time).
pub trait PositionSource {
    fn barycentric_au(&mut self, body: Body, jd: f64) -> ephem::Result<Vector3<f64>>;
}

impl PositionSource for SpiceKernel {
    fn barycentric_au(&mut self, body: Body, jd: f64) -> ephem::Result<Vector3<f64>> {
        self.position_au(body.naif_id(), jd)
    }
}

/// Running statistics, zeroed on every simulation start.
#[derive(Default)]
pub struct FrameStats {
    frame_count: u32,
    distance_sums: HashMap<Body, f64>,
    closest_counts: HashMap<Body, u32>,
}

impl FrameStats {
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn closest_count(&self, body: Body) -> u32 {
        self.closest_counts.get(&body).copied().unwrap_or(0)
    }

    pub fn closest_total(&self) -> u32 {
        self.closest_counts.values().sum()
    }

    /// Mean of the accumulated per-frame distances; zero before any frame.
    pub fn average_distance(&self, body: Body) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        self.distance_sums.get(&body).copied().unwrap_or(0.0) / self.frame_count as f64
    }

    /// Share of frames in which `body` was the closest; zero before any frame.
    pub fn closest_percentage(&self, body: Body) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        100.0 * self.closest_count(body) as f64 / self.frame_count as f64
    }

    fn reset(&mut self) {
        self.frame_count = 0;
        self.distance_sums.clear();
        self.closest_counts.clear();
    }
}

/// One planet's share of a frame report.
#[derive(Clone, Debug)]
pub struct PlanetFrame {
    pub body: Body,
    /// Heliocentric planar position in AU.
    pub position: [f64; 2],
    /// Planar distance to Earth in AU, rounded to 2 decimals.
    pub distance_au: f64,
    pub average_au: f64,
    /// 1-based rank by ascending current distance.
    pub rank: usize,
    pub closest_pct: f64,
}

/// Everything the presentation layer needs for one frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub jd: f64,
    /// Earth's heliocentric planar position in AU.
    pub earth: [f64; 2],
    pub planets: Vec<PlanetFrame>,
    pub closest: Body,
    pub frame_count: u32,
}

pub struct DistanceTracker {
    planets: Vec<Body>,
    stats: FrameStats,
}

impl Default for DistanceTracker {
    fn default() -> Self {
        Self::with_planets(Body::PLANETS.to_vec())
    }
}

impl DistanceTracker {
    pub fn with_planets(planets: Vec<Body>) -> Self {
        DistanceTracker {
            planets,
            stats: FrameStats::default(),
        }
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Zero all running statistics. Idempotent.
    pub fn reset(&mut self) {
        self.stats.reset();
    }

    /// Process one frame at `jd`. All lookups happen before any statistic
    /// is touched, so a failed frame leaves the state exactly as it was.
    pub fn process_frame(
        &mut self,
        source: &mut dyn PositionSource,
        jd: f64,
    ) -> ephem::Result<FrameReport> {
        let sun = source.barycentric_au(Body::Sun, jd)?;
        let earth3 = source.barycentric_au(Body::Earth, jd)? - sun;
        let earth = [earth3.x, earth3.y];

        let mut positions = Vec::with_capacity(self.planets.len());
        for &body in &self.planets {
            let p = source.barycentric_au(body, jd)? - sun;
            positions.push([p.x, p.y]);
        }

        // Distances are rounded before use: ordering and the running sums
        // both operate on the rounded values.
        let distances: Vec<f64> = positions
            .iter()
            .map(|p| round2(planar_distance(*p, earth)))
            .collect();

        // Minimum-index scan: on a tie the first planet in catalog order wins.
        let mut closest_idx = 0;
        for (i, &d) in distances.iter().enumerate() {
            if d < distances[closest_idx] {
                closest_idx = i;
            }
        }
        let closest = self.planets[closest_idx];

        self.stats.frame_count += 1;
        for (&body, &d) in self.planets.iter().zip(&distances) {
            *self.stats.distance_sums.entry(body).or_insert(0.0) += d;
        }
        *self.stats.closest_counts.entry(closest).or_insert(0) += 1;

        // Stable sort keeps catalog order on equal distances.
        let mut order: Vec<usize> = (0..distances.len()).collect();
        order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
        let mut ranks = vec![0usize; distances.len()];
        for (rank, &i) in order.iter().enumerate() {
            ranks[i] = rank + 1;
        }

        let planets = self
            .planets
            .iter()
            .enumerate()
            .map(|(i, &body)| PlanetFrame {
                body,
                position: positions[i],
                distance_au: distances[i],
                average_au: self.stats.average_distance(body),
                rank: ranks[i],
                closest_pct: self.stats.closest_percentage(body),
            })
            .collect();

        Ok(FrameReport {
            jd,
            earth,
            planets,
            closest,
            frame_count: self.stats.frame_count,
        })
    }
}

fn planar_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephem::EphemError;
    use assert_approx_eq::assert_approx_eq;

    /// Planets on fixed-radius circular tracks; positions depend only on
    /// (body, jd), so frames are fully deterministic.
    struct CircularSource;

    fn orbit_radius_au(body: Body) -> f64 {
        match body {
            Body::Sun => 0.0,
            Body::Mercury => 0.39,
            Body::Venus => 0.72,
            Body::Earth => 1.0,
            Body::Mars => 1.52,
            Body::Jupiter => 5.2,
            Body::Saturn => 9.5,
            Body::Uranus => 19.2,
            Body::Neptune => 30.1,
        }
    }

    impl PositionSource for CircularSource {
        fn barycentric_au(&mut self, body: Body, jd: f64) -> ephem::Result<Vector3<f64>> {
            let r = orbit_radius_au(body);
            let angle = jd / (100.0 * (1.0 + r));
            Ok(Vector3::new(r * angle.cos(), r * angle.sin(), 0.1 * r))
        }
    }

    /// Fails for one body to exercise the frame-abort path.
    struct FailingSource;

    impl PositionSource for FailingSource {
        fn barycentric_au(&mut self, body: Body, jd: f64) -> ephem::Result<Vector3<f64>> {
            if body == Body::Mars {
                return Err(EphemError::NoChain(body.naif_id()));
            }
            CircularSource.barycentric_au(body, jd)
        }
    }

    fn run_frames(tracker: &mut DistanceTracker, count: u32) -> Vec<FrameReport> {
        let mut source = CircularSource;
        (0..count)
            .map(|i| {
                tracker
                    .process_frame(&mut source, 2_451_544.5 + i as f64)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn every_frame_assigns_exactly_one_closest_planet() {
        let mut tracker = DistanceTracker::default();
        run_frames(&mut tracker, 50);
        assert_eq!(tracker.stats().frame_count(), 50);
        assert_eq!(tracker.stats().closest_total(), 50);
    }

    #[test]
    fn averages_are_the_mean_of_per_frame_distances() {
        let mut tracker = DistanceTracker::default();
        let reports = run_frames(&mut tracker, 20);

        for &body in &Body::PLANETS {
            let mean: f64 = reports
                .iter()
                .flat_map(|r| &r.planets)
                .filter(|p| p.body == body)
                .map(|p| p.distance_au)
                .sum::<f64>()
                / reports.len() as f64;
            assert_approx_eq!(tracker.stats().average_distance(body), mean, 1e-9);
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let mut tracker = DistanceTracker::default();
        run_frames(&mut tracker, 5);

        tracker.reset();
        assert_eq!(tracker.stats().frame_count(), 0);
        assert_eq!(tracker.stats().closest_total(), 0);
        assert_eq!(tracker.stats().average_distance(Body::Venus), 0.0);

        tracker.reset();
        assert_eq!(tracker.stats().frame_count(), 0);
        assert_eq!(tracker.stats().closest_total(), 0);
    }

    #[test]
    fn identical_inputs_give_identical_frames() {
        let jd = 2_451_600.5;
        let mut source = CircularSource;

        let mut tracker = DistanceTracker::default();
        let first = tracker.process_frame(&mut source, jd).unwrap();
        tracker.reset();
        let second = tracker.process_frame(&mut source, jd).unwrap();

        assert_eq!(first.closest, second.closest);
        for (a, b) in first.planets.iter().zip(&second.planets) {
            assert_eq!(a.distance_au, b.distance_au);
            assert_eq!(a.rank, b.rank);
        }
    }

    #[test]
    fn ranks_follow_ascending_distance() {
        let mut tracker = DistanceTracker::default();
        let report = run_frames(&mut tracker, 1).remove(0);

        let mut sorted: Vec<_> = report.planets.clone();
        sorted.sort_by(|a, b| a.distance_au.total_cmp(&b.distance_au));
        for (i, planet) in sorted.iter().enumerate() {
            assert_eq!(planet.rank, i + 1);
        }
        let ranks: Vec<_> = report.planets.iter().map(|p| p.rank).collect();
        let mut unique = ranks.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ranks.len());
    }

    #[test]
    fn single_planet_is_always_closest() {
        let mut tracker = DistanceTracker::with_planets(vec![Body::Mars]);
        let reports = run_frames(&mut tracker, 10);

        for report in &reports {
            assert_eq!(report.closest, Body::Mars);
        }
        assert_approx_eq!(tracker.stats().closest_percentage(Body::Mars), 100.0, 1e-12);
    }

    #[test]
    fn zero_frames_report_zero_statistics() {
        let tracker = DistanceTracker::default();
        for &body in &Body::PLANETS {
            assert_eq!(tracker.stats().average_distance(body), 0.0);
            assert_eq!(tracker.stats().closest_percentage(body), 0.0);
        }
    }

    #[test]
    fn failed_lookup_leaves_statistics_untouched() {
        let mut tracker = DistanceTracker::default();
        run_frames(&mut tracker, 3);

        let mut failing = FailingSource;
        assert!(tracker.process_frame(&mut failing, 2_451_544.5).is_err());
        assert_eq!(tracker.stats().frame_count(), 3);
        assert_eq!(tracker.stats().closest_total(), 3);
    }

    #[test]
    fn distances_are_rounded_to_two_decimals() {
        let mut tracker = DistanceTracker::default();
        let report = run_frames(&mut tracker, 1).remove(0);
        for planet in &report.planets {
            assert_approx_eq!(
                planet.distance_au,
                round2(planet.distance_au),
                f64::EPSILON
            );
        }
    }
}
