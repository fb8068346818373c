//! Explicit-VR little-endian stream codec
//!
//! On-disk layout:
//!
//! ```text
//! [128-byte preamble][DICM]
//! repeated: [group:u16][element:u16][VR:2]
//!           short VRs:  [len:u16][value]
//!           long VRs:   [reserved:u16][len:u32][value]
//! ```
//!
//! SQ values are written with explicit lengths; each item is
//! `(FFFE,E000)[len:u32][nested elements]`. Undefined-length items and
//! sequence delimiters are not supported: everything this tool writes
//! uses explicit lengths, and the reader rejects anything else.
//! Odd-length values are padded to even length on write (space for
//! text, NUL for UI) and trailing padding is stripped on read for
//! text VRs.

use crate::codec::HeaderCodec;
use crate::dataset::{DataSet, Element, Value};
use crate::error::{DicomError, Result};
use crate::tag::Tag;
use crate::vr::Vr;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

/// Preamble length before the magic bytes.
pub const PREAMBLE_LEN: usize = 128;

/// Magic bytes following the preamble.
pub const MAGIC: &[u8; 4] = b"DICM";

/// Item tag inside a sequence value.
const ITEM_TAG: Tag = Tag::new(0xFFFE, 0xE000);

/// Magic-preamble check: true iff the file starts with a 128-byte
/// preamble followed by `DICM`. Unreadable, missing, or short files
/// (zero-byte included) are simply not DICOM.
pub fn is_dicom_file(path: &Path) -> bool {
    let mut head = [0u8; PREAMBLE_LEN + 4];
    match fs::File::open(path) {
        Ok(mut file) => match file.read_exact(&mut head) {
            Ok(()) => &head[PREAMBLE_LEN..] == MAGIC,
            Err(_) => false,
        },
        Err(_) => false,
    }
}

/// The stream codec. Stateless; one shared instance serves a whole run.
#[derive(Debug, Default, Clone, Copy)]
pub struct WireCodec;

impl WireCodec {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a header file.
    pub fn read_path(path: &Path) -> Result<DataSet> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes)
    }

    /// Serialize and write a header file.
    pub fn write_path(path: &Path, dataset: &DataSet) -> Result<()> {
        let bytes = Self::encode(dataset)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Parse a full stream (preamble + magic + elements).
    pub fn decode(bytes: &[u8]) -> Result<DataSet> {
        if bytes.len() < PREAMBLE_LEN + 4 || &bytes[PREAMBLE_LEN..PREAMBLE_LEN + 4] != MAGIC {
            return Err(DicomError::BadMagic);
        }
        let mut cursor = Cursor::new(&bytes[PREAMBLE_LEN + 4..]);
        read_all_elements(&mut cursor)
    }

    /// Serialize a data set to a full stream.
    pub fn encode(dataset: &DataSet) -> Result<Vec<u8>> {
        let mut out = vec![0u8; PREAMBLE_LEN];
        out.extend_from_slice(MAGIC);
        write_elements(&mut out, dataset)?;
        Ok(out)
    }
}

impl HeaderCodec for WireCodec {
    fn read(&self, path: &Path) -> Result<DataSet> {
        Self::read_path(path)
    }

    fn write(&self, path: &Path, dataset: &DataSet) -> Result<()> {
        Self::write_path(path, dataset)
    }

    fn sniff(&self, path: &Path) -> bool {
        is_dicom_file(path)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn take<'a>(cursor: &mut Cursor<&'a [u8]>, n: usize) -> Result<&'a [u8]> {
    let start = cursor.position() as usize;
    let buf = *cursor.get_ref();
    if start + n > buf.len() {
        return Err(DicomError::Truncated {
            offset: start as u64,
            expected: n,
        });
    }
    cursor.set_position((start + n) as u64);
    Ok(&buf[start..start + n])
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16> {
    let b = take(cursor, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32> {
    let b = take(cursor, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len().saturating_sub(cursor.position() as usize)
}

/// Parse elements until the cursor is exhausted.
fn read_all_elements(cursor: &mut Cursor<&[u8]>) -> Result<DataSet> {
    let mut dataset = DataSet::new();
    while remaining(cursor) > 0 {
        dataset.put(read_element(cursor)?);
    }
    Ok(dataset)
}

fn read_element(cursor: &mut Cursor<&[u8]>) -> Result<Element> {
    let group = read_u16(cursor)?;
    let element = read_u16(cursor)?;
    let tag = Tag::new(group, element);

    let vr_bytes = take(cursor, 2)?;
    let vr = Vr::from_bytes(tag, [vr_bytes[0], vr_bytes[1]])?;

    let len = if vr.is_long_form() {
        let _reserved = read_u16(cursor)?;
        read_u32(cursor)? as usize
    } else {
        read_u16(cursor)? as usize
    };

    if vr == Vr::Sq {
        if len == u32::MAX as usize {
            return Err(DicomError::MalformedSequence {
                tag: tag.to_string(),
                reason: "undefined-length sequences are not supported".to_string(),
            });
        }
        let body = take(cursor, len)?;
        let items = read_items(tag, body)?;
        return Ok(Element::sequence(tag, items));
    }

    let raw = take(cursor, len)?;
    let value = if vr.is_text() {
        let text = String::from_utf8_lossy(raw);
        Value::Text(text.trim_end_matches(['\0', ' ']).to_string())
    } else {
        Value::Bytes(raw.to_vec())
    };
    Ok(Element::new(tag, vr, value))
}

fn read_items(seq_tag: Tag, body: &[u8]) -> Result<Vec<DataSet>> {
    let mut cursor = Cursor::new(body);
    let mut items = Vec::new();
    while remaining(&cursor) > 0 {
        let group = read_u16(&mut cursor)?;
        let element = read_u16(&mut cursor)?;
        if Tag::new(group, element) != ITEM_TAG {
            return Err(DicomError::MalformedSequence {
                tag: seq_tag.to_string(),
                reason: format!(
                    "expected item tag {}, found {}",
                    ITEM_TAG,
                    Tag::new(group, element)
                ),
            });
        }
        let item_len = read_u32(&mut cursor)? as usize;
        if item_len == u32::MAX as usize {
            return Err(DicomError::MalformedSequence {
                tag: seq_tag.to_string(),
                reason: "undefined-length items are not supported".to_string(),
            });
        }
        let item_body = take(&mut cursor, item_len)?;
        items.push(read_all_elements(&mut Cursor::new(item_body))?);
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_elements(out: &mut Vec<u8>, dataset: &DataSet) -> Result<()> {
    for element in dataset {
        write_element(out, element)?;
    }
    Ok(())
}

fn write_element(out: &mut Vec<u8>, element: &Element) -> Result<()> {
    out.write_u16::<LittleEndian>(element.tag.group)?;
    out.write_u16::<LittleEndian>(element.tag.element)?;
    out.extend_from_slice(&element.vr.as_bytes());

    let body = encode_value(element)?;
    if element.vr.is_long_form() {
        out.write_u16::<LittleEndian>(0)?;
        out.write_u32::<LittleEndian>(body.len() as u32)?;
    } else {
        let len = u16::try_from(body.len()).map_err(|_| DicomError::ValueTooLong {
            tag: element.tag.to_string(),
            len: body.len(),
        })?;
        out.write_u16::<LittleEndian>(len)?;
    }
    out.extend_from_slice(&body);
    Ok(())
}

fn encode_value(element: &Element) -> Result<Vec<u8>> {
    match &element.value {
        Value::Text(text) => {
            let mut bytes = text.as_bytes().to_vec();
            if bytes.len() % 2 != 0 {
                bytes.push(element.vr.pad_byte());
            }
            Ok(bytes)
        }
        Value::Bytes(raw) => {
            let mut bytes = raw.clone();
            if bytes.len() % 2 != 0 {
                bytes.push(0);
            }
            Ok(bytes)
        }
        Value::Items(items) => {
            let mut body = Vec::new();
            for item in items {
                let mut item_body = Vec::new();
                write_elements(&mut item_body, item)?;
                body.write_u16::<LittleEndian>(ITEM_TAG.group)?;
                body.write_u16::<LittleEndian>(ITEM_TAG.element)?;
                body.write_u32::<LittleEndian>(item_body.len() as u32)?;
                body.extend_from_slice(&item_body);
            }
            Ok(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: Tag = Tag::new(0x0010, 0x0010);
    const ROWS: Tag = Tag::new(0x0028, 0x0010);
    const REF_PAT: Tag = Tag::new(0x0008, 0x1120);

    fn sample() -> DataSet {
        let nested: DataSet = [
            Element::text(NAME, Vr::Pn, "DOE^JANE"),
            Element::text(Tag::new(0x0010, 0x0020), Vr::Lo, "PID-42"),
        ]
        .into_iter()
        .collect();
        [
            Element::text(NAME, Vr::Pn, "DOE^JOHN"),
            Element::us(ROWS, 512),
            Element::sequence(REF_PAT, vec![nested]),
            Element::bytes(Tag::new(0x7FE0, 0x0010), Vr::Ow, vec![1, 2, 3, 4]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_roundtrip() {
        let ds = sample();
        let bytes = WireCodec::encode(&ds).unwrap();
        let parsed = WireCodec::decode(&bytes).unwrap();
        assert_eq!(parsed, ds);
    }

    #[test]
    fn test_magic_present() {
        let bytes = WireCodec::encode(&sample()).unwrap();
        assert_eq!(&bytes[PREAMBLE_LEN..PREAMBLE_LEN + 4], MAGIC);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            WireCodec::decode(b"definitely not dicom"),
            Err(DicomError::BadMagic)
        ));
        let mut bytes = vec![0u8; PREAMBLE_LEN];
        bytes.extend_from_slice(b"NOPE");
        assert!(matches!(
            WireCodec::decode(&bytes),
            Err(DicomError::BadMagic)
        ));
    }

    #[test]
    fn test_decode_truncated_value() {
        let mut bytes = WireCodec::encode(&sample()).unwrap();
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(
            WireCodec::decode(&bytes),
            Err(DicomError::Truncated { .. })
        ));
    }

    #[test]
    fn test_odd_length_text_is_padded_and_trimmed() {
        let ds: DataSet = [Element::text(NAME, Vr::Pn, "ODD")].into_iter().collect();
        let bytes = WireCodec::encode(&ds).unwrap();
        // 3 bytes of text padded to 4 on the wire
        let parsed = WireCodec::decode(&bytes).unwrap();
        assert_eq!(
            parsed.get(NAME).unwrap().value,
            Value::Text("ODD".to_string())
        );
    }

    #[test]
    fn test_sniff_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.dcm");
        let bad = dir.path().join("bad.dat");
        let empty = dir.path().join("empty.dcm");
        WireCodec::write_path(&good, &sample()).unwrap();
        fs::write(&bad, b"plain text").unwrap();
        fs::write(&empty, b"").unwrap();
        assert!(is_dicom_file(&good));
        assert!(!is_dicom_file(&bad));
        assert!(!is_dicom_file(&empty));
        assert!(!is_dicom_file(&dir.path().join("missing.dcm")));
    }

    #[test]
    fn test_nested_sequence_roundtrip_depth_three() {
        let level3: DataSet = [Element::text(NAME, Vr::Pn, "DEEP")].into_iter().collect();
        let level2: DataSet = [Element::sequence(REF_PAT, vec![level3])]
            .into_iter()
            .collect();
        let level1: DataSet = [Element::sequence(REF_PAT, vec![level2])]
            .into_iter()
            .collect();
        let ds: DataSet = [Element::sequence(REF_PAT, vec![level1])]
            .into_iter()
            .collect();
        let bytes = WireCodec::encode(&ds).unwrap();
        assert_eq!(WireCodec::decode(&bytes).unwrap(), ds);
    }
}
