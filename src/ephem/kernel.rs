//! Skyfield-style kernel interface over an SPK file.
//!
//! Chains segments from the solar system barycenter (NAIF 0) to each
//! reachable body so callers can ask for any body by ID, whether the file
//! stores it directly or via an intermediate barycenter.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use nalgebra::Vector3;

use crate::ephem::spk::Spk;
use crate::ephem::{jd_to_seconds, EphemError, Result, AU_KM};

const SSB: i32 = 0;

pub struct SpiceKernel {
    spk: Spk,
    /// target ID -> (center, target) segment pairs summing from the SSB.
    chains: HashMap<i32, Vec<(i32, i32)>>,
}

impl SpiceKernel {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_spk(Spk::open(path)?))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::from_spk(Spk::from_bytes(data)?))
    }

    fn from_spk(spk: Spk) -> Self {
        SpiceKernel {
            chains: build_chains(&spk),
            spk,
        }
    }

    /// Barycentric (SSB-relative) position in AU at the given Julian date.
    pub fn position_au(&mut self, target: i32, jd: f64) -> Result<Vector3<f64>> {
        let chain = self
            .chains
            .get(&target)
            .cloned()
            .ok_or(EphemError::NoChain(target))?;
        let et = jd_to_seconds(jd);

        let mut total = Vector3::zeros();
        for (center, target) in chain {
            total += self.spk.position(center, target, et)?;
        }
        Ok(total / AU_KM)
    }

    pub fn segment_count(&self) -> usize {
        self.spk.segments.len()
    }
}

/// BFS over segment edges from the SSB, recording the segment path that
/// reaches each body.
fn build_chains(spk: &Spk) -> HashMap<i32, Vec<(i32, i32)>> {
    let mut adjacency: HashMap<i32, Vec<i32>> = HashMap::new();
    for segment in &spk.segments {
        adjacency
            .entry(segment.center)
            .or_default()
            .push(segment.target);
    }

    let mut parent: HashMap<i32, i32> = HashMap::new();
    let mut queue = VecDeque::from([SSB]);
    while let Some(node) = queue.pop_front() {
        if let Some(targets) = adjacency.get(&node) {
            for &target in targets {
                if target != SSB && !parent.contains_key(&target) {
                    parent.insert(target, node);
                    queue.push_back(target);
                }
            }
        }
    }

    let mut chains = HashMap::new();
    for &target in parent.keys() {
        let mut chain = Vec::new();
        let mut current = target;
        while let Some(&center) = parent.get(&current) {
            chain.push((center, current));
            current = center;
        }
        chain.reverse();
        chains.insert(target, chain);
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephem::{J2000_JD, SECONDS_PER_DAY};
    use assert_approx_eq::assert_approx_eq;

    const HALF_SPAN_ET: f64 = 1.0e8;

    fn put_f64(buf: &mut [u8], at: usize, value: f64) {
        buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
    }

    fn put_i32(buf: &mut [u8], at: usize, value: i32) {
        buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// One type 2 record with constant (degree 0) position coefficients.
    fn put_segment_words(buf: &mut [u8], start_word: usize, pos_km: [f64; 3]) {
        let at = (start_word - 1) * 8;
        let words = [
            0.0,          // record midpoint
            HALF_SPAN_ET, // record radius
            pos_km[0],
            pos_km[1],
            pos_km[2],
            -HALF_SPAN_ET, // INIT
            2.0 * HALF_SPAN_ET, // INTLEN
            5.0,          // RSIZE
            1.0,          // N
        ];
        for (i, value) in words.into_iter().enumerate() {
            put_f64(buf, at + i * 8, value);
        }
    }

    /// Minimal little-endian BSP: SSB -> EMB (3) and EMB -> Earth (399),
    /// each a single constant-position type 2 record.
    fn synthetic_bsp() -> Vec<u8> {
        let mut buf = vec![0u8; 4 * 1024];
        buf[0..8].copy_from_slice(b"DAF/SPK ");
        put_i32(&mut buf, 8, 2); // ND
        put_i32(&mut buf, 12, 6); // NI
        put_i32(&mut buf, 76, 2); // FWARD
        put_i32(&mut buf, 80, 2); // BWARD

        // Summary record (record 2): NEXT=0, PREV=0, NSUM=2.
        put_f64(&mut buf, 1024, 0.0);
        put_f64(&mut buf, 1032, 0.0);
        put_f64(&mut buf, 1040, 2.0);

        // Each summary: start_et, end_et, target, center, frame, type,
        // start word, end word. Data lives in record 4 (words 385..).
        for (i, (target, center, start_word)) in
            [(3, 0, 385), (399, 3, 394)].into_iter().enumerate()
        {
            let base = 1048 + i * 40;
            put_f64(&mut buf, base, -HALF_SPAN_ET);
            put_f64(&mut buf, base + 8, HALF_SPAN_ET);
            put_i32(&mut buf, base + 16, target);
            put_i32(&mut buf, base + 20, center);
            put_i32(&mut buf, base + 24, 1); // frame
            put_i32(&mut buf, base + 28, 2); // data type
            put_i32(&mut buf, base + 32, start_word);
            put_i32(&mut buf, base + 36, start_word + 8);
        }

        put_segment_words(&mut buf, 385, [0.25 * AU_KM, -1.5 * AU_KM, 0.5 * AU_KM]);
        put_segment_words(&mut buf, 394, [0.75 * AU_KM, 0.5 * AU_KM, -0.5 * AU_KM]);
        buf
    }

    #[test]
    fn parses_synthetic_kernel() {
        let kernel = SpiceKernel::from_bytes(synthetic_bsp()).unwrap();
        assert_eq!(kernel.segment_count(), 2);
        assert_eq!(kernel.chains[&3], vec![(0, 3)]);
        assert_eq!(kernel.chains[&399], vec![(0, 3), (3, 399)]);
    }

    #[test]
    fn sums_chain_to_barycentric_au() {
        let mut kernel = SpiceKernel::from_bytes(synthetic_bsp()).unwrap();

        let emb = kernel.position_au(3, J2000_JD).unwrap();
        assert_approx_eq!(emb.x, 0.25, 1e-12);
        assert_approx_eq!(emb.y, -1.5, 1e-12);
        assert_approx_eq!(emb.z, 0.5, 1e-12);

        // Earth goes through the EMB: the two segment vectors sum.
        let earth = kernel.position_au(399, J2000_JD).unwrap();
        assert_approx_eq!(earth.x, 1.0, 1e-12);
        assert_approx_eq!(earth.y, -1.0, 1e-12);
        assert_approx_eq!(earth.z, 0.0, 1e-12);
    }

    #[test]
    fn epoch_outside_coverage_is_an_error() {
        let mut kernel = SpiceKernel::from_bytes(synthetic_bsp()).unwrap();
        let jd = J2000_JD + 2.0 * HALF_SPAN_ET / SECONDS_PER_DAY;
        assert!(matches!(
            kernel.position_au(399, jd),
            Err(EphemError::OutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_body_is_an_error() {
        let mut kernel = SpiceKernel::from_bytes(synthetic_bsp()).unwrap();
        assert!(matches!(
            kernel.position_au(10, J2000_JD),
            Err(EphemError::NoChain(10))
        ));
    }
}
