//! Binary formatter: tagged little-endian records.
//!
//! Same frame semantics as the text variant (same rank rule, same value
//! order) in a compact encoding. See [`codec`](crate::codec) for the
//! byte layout and [`decode_records`](crate::codec::decode_records) to
//! read frames back.

use std::path::Path;

use ndarray::ArrayViewD;

use crate::codec::{
    encode_header, to_u32, write_f64_le, write_i64_le, write_length_prefixed_str, write_u32_le,
    write_u8, TAG_ARRAY, TAG_DOUBLE, TAG_INT,
};
use crate::error::{FormatError, OutputError};
use crate::formatter::{begin_frame, check_rank, walk_array, FormatKind, Formatter, PendingFrame, Walk};

/// Formatter producing `.bin` frame files.
#[derive(Debug, Default)]
pub struct BinaryFormatter {
    pending: Option<PendingFrame>,
}

impl BinaryFormatter {
    /// Create a closed formatter.
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&mut self) -> Result<&mut Vec<u8>, FormatError> {
        self.pending
            .as_mut()
            .map(|p| &mut p.buf)
            .ok_or(FormatError::NotOpen)
    }
}

impl Formatter for BinaryFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Binary
    }

    fn open(&mut self, path: &Path) -> Result<(), OutputError> {
        let mut frame = begin_frame(&self.pending, path)?;
        encode_header(&mut frame.buf);
        self.pending = Some(frame);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    fn view_int(&mut self, value: i64, name: &str) -> Result<(), OutputError> {
        let buf = self.buffer()?;
        write_u8(buf, TAG_INT);
        write_length_prefixed_str(buf, name);
        write_i64_le(buf, value);
        Ok(())
    }

    fn view_double(&mut self, value: f64, name: &str) -> Result<(), OutputError> {
        let buf = self.buffer()?;
        write_u8(buf, TAG_DOUBLE);
        write_length_prefixed_str(buf, name);
        write_f64_le(buf, value);
        Ok(())
    }

    fn view_array(&mut self, array: ArrayViewD<'_, f64>, name: &str) -> Result<(), OutputError> {
        check_rank(&array)?;
        let dims = array
            .shape()
            .iter()
            .map(|&d| to_u32(d, "axis extent"))
            .collect::<Result<Vec<u32>, FormatError>>()?;
        let buf = self.buffer()?;
        write_u8(buf, TAG_ARRAY);
        write_length_prefixed_str(buf, name);
        write_u32_le(buf, array.ndim() as u32);
        for d in dims {
            write_u32_le(buf, d);
        }
        walk_array(&array, |w| {
            if let Walk::Value(v) = w {
                write_f64_le(buf, v);
            }
        })?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), OutputError> {
        match self.pending.take() {
            Some(frame) => frame.commit(),
            None => Ok(()),
        }
    }

    fn abort(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_records, Record};
    use ndarray::{Array, ArrayD, IxDyn};

    #[test]
    fn frame_decodes_in_interchange_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2.bin");
        let q = Array::from_shape_fn((2, 2, 2), |(m, k, j)| (100 * j + 10 * k + m) as f64);

        let mut f = BinaryFormatter::new();
        f.open(&path).unwrap();
        f.view_int(2, "frame").unwrap();
        f.view_double(0.25, "t").unwrap();
        f.view_array(q.view().into_dyn(), "q").unwrap();
        f.close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let records = decode_records(&mut bytes.as_slice()).unwrap();
        assert_eq!(
            records,
            vec![
                Record::Int {
                    name: "frame".into(),
                    value: 2
                },
                Record::Double {
                    name: "t".into(),
                    value: 0.25
                },
                Record::Array {
                    name: "q".into(),
                    shape: vec![2, 2, 2],
                    values: vec![0.0, 1.0, 10.0, 11.0, 100.0, 101.0, 110.0, 111.0],
                },
            ]
        );
    }

    #[test]
    fn unsupported_rank_appends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.bin");
        let mut f = BinaryFormatter::new();
        f.open(&path).unwrap();
        let q = ArrayD::<f64>::zeros(IxDyn(&[1, 1, 1, 1, 1]));
        match f.view_array(q.view(), "q") {
            Err(OutputError::Format(FormatError::UnsupportedRank { rank: 5 })) => {}
            other => panic!("expected UnsupportedRank, got {other:?}"),
        }
        f.close().unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(decode_records(&mut bytes.as_slice()).unwrap(), vec![]);
    }
}
