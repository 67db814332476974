//! # Raw Data File Reader
//!
//! Random access to the traces a catalog indexes. The reader never scans:
//! retrieval hands it record indexes in result order and it seeks straight
//! to each one.
//!
//! ## File Geometry
//!
//! All geometry derives from the catalog's meta table:
//!
//! ```text
//! trace_len     = 240 + ns*4
//! stride        = trace_len          (+8 when fortran: two delimiters)
//! header_offset = 0                  (+4    when fortran)
//!                                    (+3600 when segytape)
//!                                    (+16   when segytape and fortran)
//! record i at   header_offset + i*stride
//! ```
//!
//! A tape-format (`segytape`) file carries the 3600-byte reel prologue and
//! big-endian numbers; Fortran sequential writers add 4-byte length
//! delimiters around every record and around both prologue blocks. The file
//! length is validated against the geometry at open time.
//!
//! ## Normalization
//!
//! Records are normalized in place after every read, so accessors always see
//! native byte order. Byte swapping is needed exactly when the file's order
//! differs from the machine's (`segytape != machine is big-endian`, which the
//! `byteswap=` override can force either way). Header fields swap per field
//! width. Payload samples either swap as 4-byte words (IEEE data) or convert
//! from IBM hexadecimal float (tape data, the default), see [`ibm`].
//!
//! The read buffer is allocated once and lent out per call; the borrow ends
//! before the next read.

mod ibm;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::headers::{DatasetScalars, HeaderCatalog, HEADER_LEN, SAMPLE_LEN, TAPE_PROLOGUE_LEN};
use crate::store::{CatalogStore, MetaTable};

#[derive(Debug)]
pub struct DataFileReader {
    data_path: PathBuf,
    file: File,
    buf: Vec<u8>,
    record_stride: u64,
    header_offset: u64,
    record_count: u64,
    byteswap: bool,
    ibm_floats: bool,
    scalars: DatasetScalars,
    swap_fields: Vec<(usize, usize)>,
    zero_mantissa_warned: bool,
}

impl DataFileReader {
    /// Open the raw file behind a catalog. `data_override` replaces the
    /// `datapath` recorded in the catalog's meta table.
    pub fn open(
        db_path: &Path,
        data_override: Option<&Path>,
        catalog: &HeaderCatalog,
    ) -> Result<Self> {
        let store = CatalogStore::open_single(db_path)?;
        let meta = MetaTable::default().read(&store, "meta")?;

        let scalars = DatasetScalars {
            ns: meta_int(&meta, "ns", db_path)?,
            dt: meta_int(&meta, "dt", db_path)?,
            scalel: meta_int(&meta, "scalel", db_path)?,
            scalco: meta_int(&meta, "scalco", db_path)?,
        };
        let ns = usize::try_from(scalars.ns).map_err(|_| {
            Error::inconsistent(format!(
                "catalog '{}': negative sample count {}",
                db_path.display(),
                scalars.ns
            ))
        })?;
        let record_count = meta_int(&meta, "numberoftraces", db_path)?;
        let record_count = u64::try_from(record_count).map_err(|_| {
            Error::inconsistent(format!(
                "catalog '{}': negative trace count {record_count}",
                db_path.display()
            ))
        })?;
        let segytape = meta_bool(&meta, "segytape");
        let fortran = meta_bool(&meta, "fortran");

        let data_path = match data_override {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(meta.get("datapath").map(String::as_str).unwrap_or("")),
        };

        let trace_len = HEADER_LEN + ns * SAMPLE_LEN;
        let mut record_stride = trace_len as u64;
        let mut header_offset = 0u64;
        if fortran {
            record_stride += 8;
            header_offset += 4;
        }
        if segytape {
            header_offset += TAPE_PROLOGUE_LEN as u64;
            if fortran {
                header_offset += 16;
            }
        }
        let byteswap = segytape != cfg!(target_endian = "big");

        let file = File::open(&data_path).map_err(|e| {
            Error::io(format!("data file '{}'", data_path.display()), e)
        })?;
        let file_len = file
            .metadata()
            .map_err(|e| Error::io(format!("data file '{}'", data_path.display()), e))?
            .len();
        let mut required = header_offset + record_count * record_stride;
        if fortran {
            // the final record's trailing delimiter is part of its stride;
            // only the leading one folded into header_offset is extra
            required -= 4;
        }
        if file_len < required {
            return Err(Error::io(
                format!(
                    "data file '{}' holds {file_len} bytes, {required} needed for {record_count} records",
                    data_path.display()
                ),
                ErrorKind::UnexpectedEof.into(),
            ));
        }

        let swap_fields = catalog
            .accessors()
            .filter(|(_, a)| a.size() > 1)
            .map(|(_, a)| (a.offset(), a.size()))
            .collect();

        debug!(
            data = %data_path.display(),
            records = record_count,
            ns,
            segytape,
            fortran,
            byteswap,
            "opened data file"
        );

        Ok(Self {
            data_path,
            file,
            buf: vec![0; trace_len],
            record_stride,
            header_offset,
            record_count,
            byteswap,
            ibm_floats: segytape,
            scalars,
            swap_fields,
            zero_mantissa_warned: false,
        })
    }

    /// Force byte swapping on or off, overriding the tape/machine rule.
    pub fn set_byteswap(&mut self, byteswap: bool) {
        self.byteswap = byteswap;
    }

    /// Declare the payload float encoding. IBM is assumed for tape data.
    pub fn set_ibm_floats(&mut self, ibm_floats: bool) {
        self.ibm_floats = ibm_floats;
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn trace_len(&self) -> usize {
        self.buf.len()
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn scalars(&self) -> DatasetScalars {
        self.scalars
    }

    /// Datasets retrieved together must agree on all four header scalars.
    pub fn compatible(&self, other: &DataFileReader) -> bool {
        self.scalars == other.scalars
    }

    /// Read record `index` into the reusable buffer and normalize it to
    /// native byte order. The returned slice is the full trace, header
    /// first; it stays valid until the next read.
    pub fn read(&mut self, index: u64) -> Result<&mut [u8]> {
        if index >= self.record_count {
            return Err(Error::inconsistent(format!(
                "record index {index} out of range: '{}' holds {} records",
                self.data_path.display(),
                self.record_count
            )));
        }
        let pos = self.header_offset + index * self.record_stride;
        self.file
            .seek(SeekFrom::Start(pos))
            .map_err(|e| self.record_error("seek to", index, e))?;
        self.file
            .read_exact(&mut self.buf)
            .map_err(|e| self.record_error("read", index, e))?;

        if self.byteswap {
            for &(offset, size) in &self.swap_fields {
                self.buf[offset..offset + size].reverse();
            }
            if self.ibm_floats {
                let mut zero_mantissa = false;
                for chunk in self.buf[HEADER_LEN..].chunks_exact_mut(SAMPLE_LEN) {
                    let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                    let (bits, degenerate) = ibm::ibm_to_ieee_bits(word);
                    zero_mantissa |= degenerate;
                    chunk.copy_from_slice(&bits.to_ne_bytes());
                }
                if zero_mantissa && !self.zero_mantissa_warned {
                    self.zero_mantissa_warned = true;
                    warn!(
                        data = %self.data_path.display(),
                        record = index,
                        "zero mantissa in a non-zero word: samples may not be IBM floats"
                    );
                }
            } else {
                for chunk in self.buf[HEADER_LEN..].chunks_exact_mut(SAMPLE_LEN) {
                    chunk.reverse();
                }
            }
        }
        Ok(&mut self.buf)
    }

    fn record_error(&self, action: &str, index: u64, source: std::io::Error) -> Error {
        Error::io(
            format!(
                "{action} record {index} in '{}'",
                self.data_path.display()
            ),
            source,
        )
    }
}

fn meta_int(meta: &BTreeMap<String, String>, key: &str, db_path: &Path) -> Result<i64> {
    match meta.get(key) {
        None => Ok(0),
        Some(s) if s.trim().is_empty() => Ok(0),
        Some(s) => s.trim().parse().map_err(|_| {
            Error::inconsistent(format!(
                "catalog '{}': meta key '{key}' is not an integer: '{s}'",
                db_path.display()
            ))
        }),
    }
}

fn meta_bool(meta: &BTreeMap<String, String>, key: &str) -> bool {
    meta.get(key).map(|s| s == "true").unwrap_or(false)
}
