use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use super::ibm::ibm_to_ieee_bits;
use super::DataFileReader;
use crate::error::Error;
use crate::headers::{HeaderCatalog, HEADER_LEN};
use crate::store::{CatalogStore, MetaTable};

mod ibm_words {
    use super::*;

    #[test]
    fn zero_word_is_zero() {
        assert_eq!(ibm_to_ieee_bits(0), (0, false));
    }

    #[test]
    fn known_constants_convert_exactly() {
        let cases = [
            (0x4110_0000u32, 1.0f32),
            (0x4264_0000, 100.0),
            (0xc276_a000, -118.625),
            (0x4080_0000, 0.5),
            (0xc080_0000, -0.5),
        ];
        for (ibm, expected) in cases {
            let (bits, degenerate) = ibm_to_ieee_bits(ibm);
            assert!(!degenerate);
            assert_eq!(f32::from_bits(bits), expected, "word {ibm:#010x}");
        }
    }

    #[test]
    fn zero_fraction_with_nonzero_exponent_is_flagged() {
        let (bits, degenerate) = ibm_to_ieee_bits(0x4100_0000);
        assert_eq!(f32::from_bits(bits), 0.0);
        assert!(degenerate);
    }

    #[test]
    fn overflow_clamps_to_max_magnitude() {
        let (bits, _) = ibm_to_ieee_bits(0x7f80_0000);
        assert_eq!(f32::from_bits(bits), f32::MAX);
        let (bits, _) = ibm_to_ieee_bits(0xff80_0000);
        assert_eq!(f32::from_bits(bits), f32::MIN);
    }

    #[test]
    fn underflow_flushes_to_zero() {
        let (bits, degenerate) = ibm_to_ieee_bits(0x0080_0000);
        assert_eq!(bits, 0);
        assert!(!degenerate);
    }
}

fn write_catalog(path: &Path, entries: &[(&str, String)]) {
    let store = CatalogStore::create(path).unwrap();
    let map: BTreeMap<String, String> = entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    MetaTable::default().create(&store, "meta", &map).unwrap();
}

fn meta_for(data: &Path, ns: usize, count: usize) -> Vec<(&'static str, String)> {
    vec![
        ("datapath", data.display().to_string()),
        ("ns", ns.to_string()),
        ("dt", "1000".to_string()),
        ("scalel", "0".to_string()),
        ("scalco", "0".to_string()),
        ("numberoftraces", count.to_string()),
        ("segytape", "false".to_string()),
        ("fortran", "false".to_string()),
    ]
}

fn native_trace(catalog: &HeaderCatalog, ns: usize, fldr: i64, samples: &[f32]) -> Vec<u8> {
    assert_eq!(samples.len(), ns);
    let mut trace = vec![0u8; HEADER_LEN + ns * 4];
    catalog
        .require("ns")
        .unwrap()
        .set_int(&mut trace, ns as i64)
        .unwrap();
    catalog
        .require("dt")
        .unwrap()
        .set_int(&mut trace, 1000)
        .unwrap();
    catalog
        .require("fldr")
        .unwrap()
        .set_int(&mut trace, fldr)
        .unwrap();
    for (i, s) in samples.iter().enumerate() {
        let at = HEADER_LEN + i * 4;
        trace[at..at + 4].copy_from_slice(&s.to_ne_bytes());
    }
    trace
}

/// Reverse every multi-byte header field and every 4-byte sample, turning a
/// native trace into its opposite-endian form.
fn byteswapped(catalog: &HeaderCatalog, trace: &[u8]) -> Vec<u8> {
    let mut out = trace.to_vec();
    for (_, field) in catalog.accessors() {
        if field.size() > 1 {
            out[field.offset()..field.offset() + field.size()].reverse();
        }
    }
    for chunk in out[HEADER_LEN..].chunks_exact_mut(4) {
        chunk.reverse();
    }
    out
}

fn sample(trace: &[u8], i: usize) -> f32 {
    let at = HEADER_LEN + i * 4;
    f32::from_ne_bytes([trace[at], trace[at + 1], trace[at + 2], trace[at + 3]])
}

#[test]
fn reads_native_records_by_index() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let data = dir.path().join("data.su");
    let db = dir.path().join("data.db");

    let mut bytes = Vec::new();
    for i in 0..3i64 {
        bytes.extend_from_slice(&native_trace(
            &catalog,
            4,
            100 + i,
            &[i as f32, 0.5, -0.5, 1.5],
        ));
    }
    fs::write(&data, &bytes).unwrap();
    write_catalog(&db, &meta_for(&data, 4, 3));

    let mut reader = DataFileReader::open(&db, None, &catalog).unwrap();
    assert_eq!(reader.record_count(), 3);
    assert_eq!(reader.trace_len(), HEADER_LEN + 16);

    let trace = reader.read(2).unwrap();
    assert_eq!(catalog.require("fldr").unwrap().get_int(trace).unwrap(), 102);
    assert_eq!(sample(trace, 0), 2.0);

    let trace = reader.read(0).unwrap();
    assert_eq!(catalog.require("fldr").unwrap().get_int(trace).unwrap(), 100);
    assert_eq!(sample(trace, 3), 1.5);
}

#[test]
fn tape_records_normalize_byte_order() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let data = dir.path().join("tape.segy");
    let db = dir.path().join("tape.db");

    let native = native_trace(&catalog, 2, 7_001, &[2.25, -8.0]);
    let mut bytes = vec![0u8; 3600];
    bytes.extend_from_slice(&byteswapped(&catalog, &native));

    fs::write(&data, &bytes).unwrap();
    let mut meta = meta_for(&data, 2, 1);
    meta.retain(|(k, _)| *k != "segytape");
    meta.push(("segytape", "true".to_string()));
    write_catalog(&db, &meta);

    let mut reader = DataFileReader::open(&db, None, &catalog).unwrap();
    // tape data with IEEE samples: plain byte swap, no IBM decode
    reader.set_ibm_floats(false);
    let trace = reader.read(0).unwrap();
    assert_eq!(
        catalog.require("fldr").unwrap().get_int(trace).unwrap(),
        7_001
    );
    assert_eq!(catalog.require("ns").unwrap().get_int(trace).unwrap(), 2);
    assert_eq!(sample(trace, 0), 2.25);
    assert_eq!(sample(trace, 1), -8.0);
}

#[test]
fn tape_records_decode_ibm_floats_by_default() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let data = dir.path().join("ibm.segy");
    let db = dir.path().join("ibm.db");

    let native = native_trace(&catalog, 4, 1, &[0.0; 4]);
    let mut trace = byteswapped(&catalog, &native);
    let ibm_words = [0x4110_0000u32, 0x4264_0000, 0xc276_a000, 0];
    for (i, word) in ibm_words.iter().enumerate() {
        let at = HEADER_LEN + i * 4;
        trace[at..at + 4].copy_from_slice(&word.to_be_bytes());
    }
    let mut bytes = vec![0u8; 3600];
    bytes.extend_from_slice(&trace);

    fs::write(&data, &bytes).unwrap();
    let mut meta = meta_for(&data, 4, 1);
    meta.retain(|(k, _)| *k != "segytape");
    meta.push(("segytape", "true".to_string()));
    write_catalog(&db, &meta);

    let mut reader = DataFileReader::open(&db, None, &catalog).unwrap();
    let trace = reader.read(0).unwrap();
    assert_eq!(sample(trace, 0), 1.0);
    assert_eq!(sample(trace, 1), 100.0);
    assert_eq!(sample(trace, 2), -118.625);
    assert_eq!(sample(trace, 3), 0.0);
}

#[test]
fn fortran_delimiters_shift_every_record() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let data = dir.path().join("data.f.su");
    let db = dir.path().join("data.f.db");

    let trace_len = (HEADER_LEN + 8) as u32;
    let mut bytes = Vec::new();
    for i in 0..2i64 {
        let trace = native_trace(&catalog, 2, 500 + i, &[1.0, 2.0]);
        bytes.extend_from_slice(&trace_len.to_ne_bytes());
        bytes.extend_from_slice(&trace);
        bytes.extend_from_slice(&trace_len.to_ne_bytes());
    }
    fs::write(&data, &bytes).unwrap();
    let mut meta = meta_for(&data, 2, 2);
    meta.retain(|(k, _)| *k != "fortran");
    meta.push(("fortran", "true".to_string()));
    write_catalog(&db, &meta);

    let mut reader = DataFileReader::open(&db, None, &catalog).unwrap();
    let trace = reader.read(1).unwrap();
    assert_eq!(catalog.require("fldr").unwrap().get_int(trace).unwrap(), 501);
    assert_eq!(sample(trace, 1), 2.0);
}

#[test]
fn short_files_are_rejected_at_open() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let data = dir.path().join("short.su");
    let db = dir.path().join("short.db");

    let trace = native_trace(&catalog, 4, 1, &[0.0; 4]);
    fs::write(&data, &trace).unwrap();
    // meta promises three records, the file holds one
    write_catalog(&db, &meta_for(&data, 4, 3));

    assert!(matches!(
        DataFileReader::open(&db, None, &catalog),
        Err(Error::Io { .. })
    ));
}

#[test]
fn data_override_replaces_the_recorded_path() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let moved = dir.path().join("moved.su");
    let db = dir.path().join("moved.db");

    fs::write(&moved, native_trace(&catalog, 2, 9, &[0.0, 0.0])).unwrap();
    let missing = dir.path().join("long-gone.su");
    write_catalog(&db, &meta_for(&missing, 2, 1));

    assert!(DataFileReader::open(&db, None, &catalog).is_err());
    let mut reader = DataFileReader::open(&db, Some(moved.as_path()), &catalog).unwrap();
    let trace = reader.read(0).unwrap();
    assert_eq!(catalog.require("fldr").unwrap().get_int(trace).unwrap(), 9);
}

#[test]
fn unparseable_meta_scalars_are_inconsistent() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let data = dir.path().join("bad.su");
    let db = dir.path().join("bad.db");

    fs::write(&data, native_trace(&catalog, 2, 1, &[0.0, 0.0])).unwrap();
    let mut meta = meta_for(&data, 2, 1);
    meta.retain(|(k, _)| *k != "dt");
    meta.push(("dt", "4000us".to_string()));
    write_catalog(&db, &meta);

    assert!(matches!(
        DataFileReader::open(&db, None, &catalog),
        Err(Error::InconsistentDataset { .. })
    ));
}

#[test]
fn missing_meta_keys_default_instead_of_failing() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();
    let data = dir.path().join("sparse.su");
    let db = dir.path().join("sparse.db");

    // ns omitted: traces are header-only, counts default to zero
    fs::write(&data, b"").unwrap();
    write_catalog(&db, &[("datapath", data.display().to_string())]);

    let reader = DataFileReader::open(&db, None, &catalog).unwrap();
    assert_eq!(reader.record_count(), 0);
    assert_eq!(reader.trace_len(), HEADER_LEN);
}

#[test]
fn compatibility_requires_every_scalar_to_match() {
    let dir = tempdir().unwrap();
    let catalog = HeaderCatalog::standard();

    let mut readers = Vec::new();
    for (name, dt) in [("a", "1000"), ("b", "1000"), ("c", "2000")] {
        let data = dir.path().join(format!("{name}.su"));
        let db = dir.path().join(format!("{name}.db"));
        fs::write(&data, native_trace(&catalog, 2, 1, &[0.0, 0.0])).unwrap();
        let mut meta = meta_for(&data, 2, 1);
        meta.retain(|(k, _)| *k != "dt");
        meta.push(("dt", dt.to_string()));
        write_catalog(&db, &meta);
        readers.push(DataFileReader::open(&db, None, &catalog).unwrap());
    }

    assert!(readers[0].compatible(&readers[1]));
    // same ns, scalel, scalco; only dt differs, and that must be enough
    assert!(!readers[0].compatible(&readers[2]));
}
