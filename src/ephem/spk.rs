//! SPK segment table and Chebyshev record evaluation.
//!
//! Supports data type 2 (position) and type 3 (position + velocity); only
//! the position components are evaluated, which is all this program needs.

use std::collections::HashMap;
use std::path::Path;

use nalgebra::Vector3;

use crate::ephem::chebyshev::{clenshaw, normalize};
use crate::ephem::daf::Daf;
use crate::ephem::{seconds_to_jd, EphemError, Result};

pub struct Spk {
    daf: Daf,
    pub segments: Vec<Segment>,
    index: HashMap<(i32, i32), usize>,
}

pub struct Segment {
    /// Coverage in TDB seconds past J2000.
    pub start_et: f64,
    pub end_et: f64,
    pub target: i32,
    pub center: i32,
    pub data_type: i32,
    start_word: usize,
    end_word: usize,
    data: Option<SegmentData>,
}

/// Lazily loaded coefficient array for one segment.
struct SegmentData {
    init: f64,
    intlen: f64,
    record_words: usize,
    coeff_count: usize,
    record_count: usize,
    words: Vec<f64>,
}

impl Spk {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_daf(Daf::open(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_daf(Daf::from_bytes(data)?)
    }

    fn from_daf(daf: Daf) -> Result<Self> {
        let mut segments = Vec::new();
        let mut index = HashMap::new();

        for summary in daf.summaries()? {
            // SPK summaries carry 2 doubles and 6 integers.
            if summary.doubles.len() < 2 || summary.ints.len() < 6 {
                continue;
            }
            let [target, center, _frame, data_type, start_word, end_word]: [i32; 6] =
                match summary.ints[0..6].try_into() {
                    Ok(fields) => fields,
                    Err(_) => continue,
                };
            if data_type != 2 && data_type != 3 {
                continue;
            }
            if start_word < 1 || end_word < start_word {
                continue;
            }

            // A later segment for the same pair wins, as in SPICE.
            index.insert((center, target), segments.len());
            segments.push(Segment {
                start_et: summary.doubles[0],
                end_et: summary.doubles[1],
                target,
                center,
                data_type,
                start_word: start_word as usize,
                end_word: end_word as usize,
                data: None,
            });
        }

        if segments.is_empty() {
            return Err(EphemError::InvalidFormat(
                "no usable SPK segments (types 2/3)".into(),
            ));
        }
        Ok(Spk {
            daf,
            segments,
            index,
        })
    }

    /// Position of `target` relative to `center` in km at `et` seconds
    /// past J2000.
    pub fn position(&mut self, center: i32, target: i32, et: f64) -> Result<Vector3<f64>> {
        let idx = *self
            .index
            .get(&(center, target))
            .ok_or(EphemError::SegmentNotFound { center, target })?;
        let Spk { daf, segments, .. } = self;
        segments[idx].position(daf, et)
    }
}

impl Segment {
    fn position(&mut self, daf: &Daf, et: f64) -> Result<Vector3<f64>> {
        if et < self.start_et || et > self.end_et {
            return Err(self.out_of_range(et));
        }

        let out_of_range = self.out_of_range(et);
        let data = self.load(daf)?;

        let mut record = ((et - data.init) / data.intlen).floor() as usize;
        if record >= data.record_count {
            if record == data.record_count {
                // Epoch exactly at the end of coverage: use the last record.
                record -= 1;
            } else {
                return Err(out_of_range);
            }
        }

        let base = record * data.record_words;
        let mid = data.words[base];
        let radius = data.words[base + 1];
        let t = normalize(et, mid, radius);

        let component = |k: usize| {
            let start = base + 2 + k * data.coeff_count;
            clenshaw(&data.words[start..start + data.coeff_count], t)
        };
        Ok(Vector3::new(component(0), component(1), component(2)))
    }

    fn out_of_range(&self, et: f64) -> EphemError {
        EphemError::OutOfRange {
            jd: seconds_to_jd(et),
            start_jd: seconds_to_jd(self.start_et),
            end_jd: seconds_to_jd(self.end_et),
        }
    }

    fn load(&mut self, daf: &Daf) -> Result<&SegmentData> {
        if self.data.is_none() {
            let words = daf.read_words(self.start_word, self.end_word)?;
            if words.len() < 4 {
                return Err(EphemError::InvalidFormat("segment data too small".into()));
            }

            // Trailer: INIT, INTLEN, RSIZE, N.
            let n = words.len();
            let init = words[n - 4];
            let intlen = words[n - 3];
            let record_words = words[n - 2] as usize;
            let record_count = words[n - 1] as usize;

            let components = match self.data_type {
                2 => 3,
                3 => 6,
                other => return Err(EphemError::UnsupportedDataType(other)),
            };
            if record_count == 0 || record_words < 2 + components || intlen <= 0.0 {
                return Err(EphemError::InvalidFormat(format!(
                    "bad type {} record size {record_words}",
                    self.data_type
                )));
            }
            let expected = record_count
                .checked_mul(record_words)
                .and_then(|w| w.checked_add(4));
            if expected != Some(n) {
                return Err(EphemError::InvalidFormat(format!(
                    "segment length {n} does not match {record_count} records of {record_words}"
                )));
            }

            self.data = Some(SegmentData {
                init,
                intlen,
                record_words,
                coeff_count: (record_words - 2) / components,
                record_count,
                words,
            });
        }
        // Unreachable fallback: the block above just populated it.
        self.data
            .as_ref()
            .ok_or_else(|| EphemError::InvalidFormat("segment data missing".into()))
    }
}
