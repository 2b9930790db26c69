//! Binary encode/decode for the binary frame format.
//!
//! All integers are little-endian. Labels are length-prefixed with a
//! `u32`. The format is intentionally simple: no compression, no
//! alignment padding, no self-describing schema beyond one tag byte per
//! record.
//!
//! ```text
//! [MAGIC "STWF"] [VERSION u8] [Record 1] [Record 2] ... [Record N]
//! ```

use std::io::{Read, Write};

use crate::error::FormatError;

/// Magic bytes at the start of every binary frame.
pub const MAGIC: [u8; 4] = *b"STWF";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

/// Record tag for a labelled `i64`.
pub const TAG_INT: u8 = 0;
/// Record tag for a labelled `f64`.
pub const TAG_DOUBLE: u8 = 1;
/// Record tag for a labelled array.
pub const TAG_ARRAY: u8 = 2;

/// Upper bound on elements reserved ahead of reading them.
const MAX_PREALLOC: usize = 1 << 16;

/// One decoded record of a binary frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// A labelled integer.
    Int {
        /// Label.
        name: String,
        /// Value.
        value: i64,
    },
    /// A labelled double.
    Double {
        /// Label.
        name: String,
        /// Value.
        value: f64,
    },
    /// A labelled array.
    Array {
        /// Label.
        name: String,
        /// Extent of each axis.
        shape: Vec<usize>,
        /// Values in interchange order (first axis fastest).
        values: Vec<f64>,
    },
}

// ── Primitive writers ───────────────────────────────────────────
//
// The frame is assembled in a `Vec<u8>`, whose `Write` impl never fails,
// so these writers are infallible.

/// Write a single byte.
pub fn write_u8(w: &mut Vec<u8>, v: u8) {
    w.push(v);
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut Vec<u8>, v: u32) {
    w.extend_from_slice(&v.to_le_bytes());
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut Vec<u8>, v: i64) {
    w.extend_from_slice(&v.to_le_bytes());
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut Vec<u8>, v: f64) {
    w.extend_from_slice(&v.to_le_bytes());
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut Vec<u8>, s: &str) {
    write_u32_le(w, s.len() as u32);
    w.extend_from_slice(s.as_bytes());
}

/// Write the magic bytes and version.
pub fn encode_header(w: &mut Vec<u8>) {
    w.extend_from_slice(&MAGIC);
    write_u8(w, FORMAT_VERSION);
}

// ── Primitive readers ───────────────────────────────────────────

fn truncated(e: std::io::Error) -> FormatError {
    FormatError::Malformed {
        detail: format!("truncated frame: {e}"),
    }
}

/// Read a single byte, or `None` at a clean end of input.
pub fn read_tag(r: &mut dyn Read) -> Result<Option<u8>, FormatError> {
    let mut buf = [0u8; 1];
    match r.read(&mut buf).map_err(truncated)? {
        0 => Ok(None),
        _ => Ok(Some(buf[0])),
    }
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, FormatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub fn read_i64_le(r: &mut dyn Read) -> Result<i64, FormatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(i64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, FormatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, FormatError> {
    let len = read_u32_le(r)?;
    let mut buf = Vec::new();
    Read::take(&mut *r, u64::from(len))
        .read_to_end(&mut buf)
        .map_err(truncated)?;
    if buf.len() as u64 != u64::from(len) {
        return Err(FormatError::Malformed {
            detail: format!("truncated frame: label of {len} bytes cut short"),
        });
    }
    String::from_utf8(buf).map_err(|e| FormatError::Malformed {
        detail: format!("invalid UTF-8 label: {e}"),
    })
}

// ── Frame decode ────────────────────────────────────────────────

/// Decode a complete binary frame.
///
/// Validates the magic and version, then reads records until the input
/// is exhausted.
pub fn decode_records(r: &mut dyn Read) -> Result<Vec<Record>, FormatError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic).map_err(truncated)?;
    if magic != MAGIC {
        return Err(FormatError::Malformed {
            detail: format!("invalid magic bytes {magic:?}"),
        });
    }
    let mut version = [0u8; 1];
    r.read_exact(&mut version).map_err(truncated)?;
    if version[0] != FORMAT_VERSION {
        return Err(FormatError::Malformed {
            detail: format!("unsupported format version {}", version[0]),
        });
    }

    let mut records = Vec::new();
    while let Some(tag) = read_tag(r)? {
        let name = read_length_prefixed_str(r)?;
        let record = match tag {
            TAG_INT => Record::Int {
                name,
                value: read_i64_le(r)?,
            },
            TAG_DOUBLE => Record::Double {
                name,
                value: read_f64_le(r)?,
            },
            TAG_ARRAY => {
                let rank = read_u32_le(r)?;
                if !(2..=4).contains(&rank) {
                    return Err(FormatError::Malformed {
                        detail: format!("array '{name}' has unsupported rank {rank}"),
                    });
                }
                let mut shape = Vec::with_capacity(4);
                for _ in 0..rank {
                    shape.push(read_u32_le(r)? as usize);
                }
                let count = element_count(&shape).ok_or_else(|| FormatError::Malformed {
                    detail: format!("array '{name}' shape {shape:?} overflows"),
                })?;
                let mut values = Vec::with_capacity(count.min(MAX_PREALLOC));
                for _ in 0..count {
                    values.push(read_f64_le(r)?);
                }
                Record::Array {
                    name,
                    shape,
                    values,
                }
            }
            other => {
                return Err(FormatError::Malformed {
                    detail: format!("unknown record tag {other}"),
                })
            }
        };
        records.push(record);
    }
    Ok(records)
}

/// Number of elements in an array of `shape`, or `None` on overflow.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Convert a label length or axis extent to its on-disk `u32`.
pub fn to_u32(value: usize, what: &str) -> Result<u32, FormatError> {
    u32::try_from(value).map_err(|_| FormatError::Malformed {
        detail: format!("{what} {value} does not fit in u32"),
    })
}

fn check_record(record: &Record) -> Result<(), FormatError> {
    let (Record::Int { name, .. } | Record::Double { name, .. } | Record::Array { name, .. }) =
        record;
    to_u32(name.len(), "label length")?;
    if let Record::Array { shape, values, .. } = record {
        if !(2..=4).contains(&shape.len()) {
            return Err(FormatError::UnsupportedRank { rank: shape.len() });
        }
        for &d in shape {
            to_u32(d, "axis extent")?;
        }
        if element_count(shape) != Some(values.len()) {
            return Err(FormatError::Malformed {
                detail: format!(
                    "array '{name}' has {} values for shape {shape:?}",
                    values.len()
                ),
            });
        }
    }
    Ok(())
}

/// Encode a record list (used by tooling that rewrites frames).
///
/// Records the decoder would reject (unsupported rank, extents or
/// labels wider than `u32`, value count not matching the shape) fail
/// with [`std::io::ErrorKind::InvalidInput`] and nothing is written.
pub fn encode_records(w: &mut dyn Write, records: &[Record]) -> std::io::Result<()> {
    for record in records {
        check_record(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    }
    let mut buf = Vec::new();
    encode_header(&mut buf);
    for record in records {
        match record {
            Record::Int { name, value } => {
                write_u8(&mut buf, TAG_INT);
                write_length_prefixed_str(&mut buf, name);
                write_i64_le(&mut buf, *value);
            }
            Record::Double { name, value } => {
                write_u8(&mut buf, TAG_DOUBLE);
                write_length_prefixed_str(&mut buf, name);
                write_f64_le(&mut buf, *value);
            }
            Record::Array {
                name,
                shape,
                values,
            } => {
                write_u8(&mut buf, TAG_ARRAY);
                write_length_prefixed_str(&mut buf, name);
                write_u32_le(&mut buf, shape.len() as u32);
                for &d in shape {
                    // Checked above.
                    write_u32_le(&mut buf, d as u32);
                }
                for &v in values {
                    write_f64_le(&mut buf, v);
                }
            }
        }
    }
    w.write_all(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_magic() {
        let data = b"QXYZ\x01";
        match decode_records(&mut data.as_slice()) {
            Err(FormatError::Malformed { detail }) => assert!(detail.contains("magic")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_future_version() {
        let mut data = MAGIC.to_vec();
        data.push(FORMAT_VERSION + 1);
        assert!(matches!(
            decode_records(&mut data.as_slice()),
            Err(FormatError::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_array_is_malformed() {
        let mut buf = Vec::new();
        encode_records(
            &mut buf,
            &[Record::Array {
                name: "q".into(),
                shape: vec![2, 2],
                values: vec![1.0, 2.0, 3.0, 4.0],
            }],
        )
        .unwrap();
        buf.truncate(buf.len() - 3);
        assert!(matches!(
            decode_records(&mut buf.as_slice()),
            Err(FormatError::Malformed { .. })
        ));
    }

    fn array_header(rank: u32, dims: &[u32]) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_header(&mut buf);
        write_u8(&mut buf, TAG_ARRAY);
        write_length_prefixed_str(&mut buf, "");
        write_u32_le(&mut buf, rank);
        for &d in dims {
            write_u32_le(&mut buf, d);
        }
        buf
    }

    #[test]
    fn huge_shape_is_malformed_not_a_panic() {
        let buf = array_header(2, &[u32::MAX, u32::MAX]);
        assert_eq!(buf.len(), 22);
        match decode_records(&mut buf.as_slice()) {
            Err(FormatError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_shape_is_malformed() {
        let buf = array_header(4, &[u32::MAX; 4]);
        match decode_records(&mut buf.as_slice()) {
            Err(FormatError::Malformed { detail }) => assert!(detail.contains("overflows")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_rank_is_malformed() {
        for rank in [0, 1, 5, u32::MAX] {
            let buf = array_header(rank, &[]);
            match decode_records(&mut buf.as_slice()) {
                Err(FormatError::Malformed { detail }) => assert!(detail.contains("rank")),
                other => panic!("rank {rank}: expected Malformed, got {other:?}"),
            }
        }
    }

    #[test]
    fn oversized_label_length_is_malformed() {
        let mut buf = Vec::new();
        encode_header(&mut buf);
        write_u8(&mut buf, TAG_INT);
        write_u32_le(&mut buf, u32::MAX);
        buf.extend_from_slice(b"q");
        assert!(matches!(
            decode_records(&mut buf.as_slice()),
            Err(FormatError::Malformed { .. })
        ));
    }

    #[test]
    fn encode_rejects_shape_value_mismatch() {
        let mut buf = Vec::new();
        let err = encode_records(
            &mut buf,
            &[Record::Array {
                name: "q".into(),
                shape: vec![2, 3],
                values: vec![1.0; 5],
            }],
        )
        .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_rejects_unsupported_rank() {
        let mut buf = Vec::new();
        let err = encode_records(
            &mut buf,
            &[Record::Array {
                name: "q".into(),
                shape: vec![3],
                values: vec![1.0; 3],
            }],
        )
        .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn header_only_decodes_to_no_records() {
        let mut buf = Vec::new();
        encode_header(&mut buf);
        assert_eq!(decode_records(&mut buf.as_slice()).unwrap(), vec![]);
    }
}
