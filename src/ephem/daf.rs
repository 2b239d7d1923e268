//! NAIF Double Array File (DAF) container reading.
//!
//! A DAF is a sequence of 1024-byte records: a header record, optional
//! comment records, then a linked chain of summary/name record pairs that
//! describe where each data array lives in the file.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::ephem::{EphemError, Result};

const RECORD_BYTES: usize = 1024;
const WORD_BYTES: usize = 8;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Endian {
    Big,
    Little,
}

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Mapped(map) => map,
            Backing::Owned(buf) => buf,
        }
    }
}

/// A segment summary: ND doubles followed by NI integers.
pub struct Summary {
    pub doubles: Vec<f64>,
    pub ints: Vec<i32>,
}

pub struct Daf {
    backing: Backing,
    endian: Endian,
    /// Doubles per summary.
    nd: usize,
    /// Integers per summary.
    ni: usize,
    /// Record number of the first summary record.
    fward: usize,
}

impl Daf {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let io = |source| EphemError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        };
        let file = File::open(path.as_ref()).map_err(io)?;
        // Kernels run to hundreds of megabytes; map instead of slurping.
        let map = unsafe { Mmap::map(&file) }.map_err(io)?;
        Self::from_backing(Backing::Mapped(map))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_backing(Backing::Owned(data))
    }

    fn from_backing(backing: Backing) -> Result<Self> {
        let bytes = backing.bytes();
        if bytes.len() < RECORD_BYTES {
            return Err(EphemError::InvalidFormat(
                "file is smaller than one DAF record".into(),
            ));
        }

        let locidw = String::from_utf8_lossy(&bytes[0..8]).trim_end().to_string();
        if !locidw.starts_with("DAF/") {
            return Err(EphemError::InvalidFormat(format!(
                "not a DAF file (id word {locidw:?})"
            )));
        }

        // ND and NI are small; whichever byte order yields sane values wins.
        let nd_le = LittleEndian::read_u32(&bytes[8..12]);
        let ni_le = LittleEndian::read_u32(&bytes[12..16]);
        let nd_be = BigEndian::read_u32(&bytes[8..12]);
        let ni_be = BigEndian::read_u32(&bytes[12..16]);
        let sane = |nd: u32, ni: u32| (1..10).contains(&nd) && (1..10).contains(&ni);

        let (endian, nd, ni) = if sane(nd_le, ni_le) {
            (Endian::Little, nd_le, ni_le)
        } else if sane(nd_be, ni_be) {
            (Endian::Big, nd_be, ni_be)
        } else {
            return Err(EphemError::InvalidFormat(format!(
                "cannot determine byte order (LE {nd_le}/{ni_le}, BE {nd_be}/{ni_be})"
            )));
        };

        let fward = match endian {
            Endian::Little => LittleEndian::read_u32(&bytes[76..80]),
            Endian::Big => BigEndian::read_u32(&bytes[76..80]),
        } as usize;

        let daf = Daf {
            backing,
            endian,
            nd: nd as usize,
            ni: ni as usize,
            fward,
        };
        if fward < 2 || daf.record(fward).is_err() {
            return Err(EphemError::InvalidFormat(format!(
                "invalid forward pointer {fward}"
            )));
        }
        Ok(daf)
    }

    /// Slice a 1024-byte record by its 1-indexed record number.
    fn record(&self, number: usize) -> Result<&[u8]> {
        let bytes = self.backing.bytes();
        let start = number
            .checked_sub(1)
            .map(|n| n * RECORD_BYTES)
            .ok_or_else(|| EphemError::InvalidFormat("record number zero".into()))?;
        bytes
            .get(start..start + RECORD_BYTES)
            .ok_or_else(|| EphemError::InvalidFormat(format!("record {number} past end of file")))
    }

    /// Walk the summary record chain and decode every segment summary.
    pub fn summaries(&self) -> Result<Vec<Summary>> {
        let step = WORD_BYTES * (self.nd + self.ni.div_ceil(2));
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut number = self.fward;

        while number > 0 {
            if !visited.insert(number) {
                break; // cycle in the chain
            }
            let record = self.record(number)?;
            let next = self.read_f64(&record[0..8]) as usize;
            let count = self.read_f64(&record[16..24]) as usize;

            if 24 + count * step > RECORD_BYTES {
                return Err(EphemError::InvalidFormat(format!(
                    "summary record {number} claims {count} summaries"
                )));
            }

            for i in 0..count {
                let base = 24 + i * step;
                let mut doubles = Vec::with_capacity(self.nd);
                for j in 0..self.nd {
                    let at = base + j * WORD_BYTES;
                    doubles.push(self.read_f64(&record[at..at + WORD_BYTES]));
                }
                let int_base = base + self.nd * WORD_BYTES;
                let mut ints = Vec::with_capacity(self.ni);
                for j in 0..self.ni {
                    // Integers are packed two per 8-byte word.
                    let at = int_base + (j / 2) * WORD_BYTES + (j % 2) * 4;
                    ints.push(self.read_i32(&record[at..at + 4]));
                }
                result.push(Summary { doubles, ints });
            }

            if next == 0 || next == number {
                break;
            }
            number = next;
        }

        if result.is_empty() {
            return Err(EphemError::InvalidFormat("no segment summaries".into()));
        }
        Ok(result)
    }

    /// Read doubles by inclusive 1-indexed word address range.
    pub fn read_words(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start < 1 || end < start {
            return Err(EphemError::InvalidFormat(format!(
                "bad word address range {start}..{end}"
            )));
        }
        let bytes = self.backing.bytes();
        let byte_start = (start - 1) * WORD_BYTES;
        let count = end - start + 1;
        let slice = bytes
            .get(byte_start..byte_start + count * WORD_BYTES)
            .ok_or_else(|| {
                EphemError::InvalidFormat(format!("word range {start}..{end} past end of file"))
            })?;
        Ok(slice
            .chunks_exact(WORD_BYTES)
            .map(|chunk| self.read_f64(chunk))
            .collect())
    }

    fn read_f64(&self, bytes: &[u8]) -> f64 {
        match self.endian {
            Endian::Little => LittleEndian::read_f64(bytes),
            Endian::Big => BigEndian::read_f64(bytes),
        }
    }

    fn read_i32(&self, bytes: &[u8]) -> i32 {
        match self.endian {
            Endian::Little => LittleEndian::read_i32(bytes),
            Endian::Big => BigEndian::read_i32(bytes),
        }
    }
}
