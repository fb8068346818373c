//! DICOMDIR redaction
//!
//! A DICOMDIR file carries no PHI at its top level, but the first
//! records of the directory-record sequence (patient and study level)
//! do. The file also stores absolute byte offsets pointing at those
//! records, so listed fields are overwritten with a same-length run of
//! `'0'` rather than deleted; shortening or removing anything would
//! corrupt the offsets.

use crate::error::{DeidError, Result};
use crate::policy::TagPolicy;
use deidcm_dicom::{DataSet, Value, DIRECTORY_RECORD_SEQUENCE};
use tracing::debug;

/// Fill character for overwritten values.
const FILLER: u8 = b'0';

/// How many leading directory records carry PHI fields.
const PHI_RECORDS: usize = 2;

/// Redacts a parsed DICOMDIR header in place.
pub struct DicomDirRedactor<'a> {
    policy: &'a TagPolicy,
}

impl<'a> DicomDirRedactor<'a> {
    /// `policy` is always the redact list, regardless of the run's
    /// instance-policy mode.
    pub fn new(policy: &'a TagPolicy) -> Self {
        Self { policy }
    }

    /// Zero-fill listed fields in the first two directory records.
    /// A missing or empty record sequence is a structural mismatch.
    pub fn redact(&self, header: &mut DataSet) -> Result<()> {
        let sequence = header.get_mut(DIRECTORY_RECORD_SEQUENCE).ok_or_else(|| {
            DeidError::Redaction(format!(
                "DICOMDIR is missing the {DIRECTORY_RECORD_SEQUENCE} record sequence"
            ))
        })?;
        let records = sequence.items_mut().ok_or_else(|| {
            DeidError::Redaction(format!(
                "{DIRECTORY_RECORD_SEQUENCE} is not a sequence element"
            ))
        })?;
        if records.is_empty() {
            return Err(DeidError::Redaction(
                "DICOMDIR record sequence has no records".to_string(),
            ));
        }

        for record in records.iter_mut().take(PHI_RECORDS) {
            for tag in record.tags() {
                if !self.policy.contains(tag) {
                    continue;
                }
                if let Some(elem) = record.get_mut(tag) {
                    debug!(
                        field = %tag,
                        keyword = tag.keyword().unwrap_or("-"),
                        "filling index field"
                    );
                    fill_in_place(&mut elem.value);
                }
            }
        }
        Ok(())
    }
}

/// Overwrite a value with filler of identical byte length. Nested
/// sequences are left untouched; only scalar fields are filled.
fn fill_in_place(value: &mut Value) {
    match value {
        Value::Text(text) => {
            // text.len() is bytes, so the fill preserves encoded length
            *text = String::from(FILLER as char).repeat(text.len());
        }
        Value::Bytes(bytes) => bytes.fill(FILLER),
        Value::Items(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyMode;
    use deidcm_dicom::{Element, Tag, Vr};
    use deidcm_test_utils::{dicomdir_dataset, PATIENT_ID, PATIENT_NAME};

    fn policy() -> TagPolicy {
        TagPolicy::load(PolicyMode::Redact, None).unwrap()
    }

    fn records(header: &DataSet) -> &[DataSet] {
        header
            .get(DIRECTORY_RECORD_SEQUENCE)
            .and_then(|elem| elem.items())
            .unwrap()
    }

    #[test]
    fn test_fields_zeroed_with_length_preserved() {
        let policy = policy();
        let mut header = dicomdir_dataset();
        let original = header.clone();
        DicomDirRedactor::new(&policy).redact(&mut header).unwrap();

        let before = records(&original);
        let after = records(&header);
        for (b_rec, a_rec) in before.iter().zip(after.iter()).take(2) {
            for b_elem in b_rec.iter() {
                let a_elem = a_rec.get(b_elem.tag).expect("no field was deleted");
                assert_eq!(
                    b_elem.value.byte_len(),
                    a_elem.value.byte_len(),
                    "length changed for {}",
                    b_elem.tag
                );
            }
        }
        match &after[0].get(PATIENT_NAME).unwrap().value {
            Value::Text(text) => assert!(text.chars().all(|c| c == '0')),
            other => panic!("unexpected value {other:?}"),
        }
        match &after[0].get(PATIENT_ID).unwrap().value {
            Value::Text(text) => assert_eq!(text.len(), "PID-0001".len()),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_offsets_and_later_records_untouched() {
        let policy = policy();
        let mut header = dicomdir_dataset();
        let original = header.clone();
        DicomDirRedactor::new(&policy).redact(&mut header).unwrap();

        let offset = Tag::new(0x0004, 0x1400);
        assert_eq!(
            records(&header)[0].get(offset),
            records(&original)[0].get(offset)
        );
        // the third (series-level) record is beyond the PHI window
        assert_eq!(records(&header)[2], records(&original)[2]);
    }

    #[test]
    fn test_binary_value_filled_same_length() {
        let policy = policy();
        let record: DataSet = [Element::bytes(
            Tag::new(0x0008, 0x0050),
            Vr::Ob,
            vec![0xAA, 0xBB, 0xCC],
        )]
        .into_iter()
        .collect();
        let mut header: DataSet =
            [Element::sequence(DIRECTORY_RECORD_SEQUENCE, vec![record])]
                .into_iter()
                .collect();
        DicomDirRedactor::new(&policy).redact(&mut header).unwrap();
        match &records(&header)[0].get(Tag::new(0x0008, 0x0050)).unwrap().value {
            Value::Bytes(bytes) => assert_eq!(bytes, &vec![b'0'; 3]),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_missing_sequence_is_structural_error() {
        let policy = policy();
        let mut header = DataSet::new();
        let err = DicomDirRedactor::new(&policy).redact(&mut header).unwrap_err();
        assert!(matches!(err, DeidError::Redaction(_)));
    }

    #[test]
    fn test_empty_sequence_is_structural_error() {
        let policy = policy();
        let mut header: DataSet =
            [Element::sequence(DIRECTORY_RECORD_SEQUENCE, vec![])]
                .into_iter()
                .collect();
        assert!(DicomDirRedactor::new(&policy).redact(&mut header).is_err());
    }
}
