//! Standard tag dictionary
//!
//! A small keyword table covering the tags the shipped policy lists
//! reference, plus the DICOMDIR structural tags. Lookup is linear; the
//! table is tiny and loaded-once policy parsing is the only caller.

use crate::tag::Tag;

const ENTRIES: &[(Tag, &str)] = &[
    (Tag::new(0x0004, 0x1220), "DirectoryRecordSequence"),
    (Tag::new(0x0004, 0x1400), "OffsetOfTheNextDirectoryRecord"),
    (Tag::new(0x0004, 0x1410), "RecordInUseFlag"),
    (
        Tag::new(0x0004, 0x1420),
        "OffsetOfReferencedLowerLevelDirectoryEntity",
    ),
    (Tag::new(0x0004, 0x1430), "DirectoryRecordType"),
    (Tag::new(0x0008, 0x0005), "SpecificCharacterSet"),
    (Tag::new(0x0008, 0x0008), "ImageType"),
    (Tag::new(0x0008, 0x0016), "SOPClassUID"),
    (Tag::new(0x0008, 0x0018), "SOPInstanceUID"),
    (Tag::new(0x0008, 0x0020), "StudyDate"),
    (Tag::new(0x0008, 0x0021), "SeriesDate"),
    (Tag::new(0x0008, 0x0030), "StudyTime"),
    (Tag::new(0x0008, 0x0031), "SeriesTime"),
    (Tag::new(0x0008, 0x0050), "AccessionNumber"),
    (Tag::new(0x0008, 0x0060), "Modality"),
    (Tag::new(0x0008, 0x0080), "InstitutionName"),
    (Tag::new(0x0008, 0x0081), "InstitutionAddress"),
    (Tag::new(0x0008, 0x0090), "ReferringPhysicianName"),
    (Tag::new(0x0008, 0x1010), "StationName"),
    (Tag::new(0x0008, 0x1030), "StudyDescription"),
    (Tag::new(0x0008, 0x103E), "SeriesDescription"),
    (Tag::new(0x0008, 0x1050), "PerformingPhysicianName"),
    (Tag::new(0x0008, 0x1070), "OperatorsName"),
    (Tag::new(0x0008, 0x1110), "ReferencedStudySequence"),
    (Tag::new(0x0008, 0x1120), "ReferencedPatientSequence"),
    (Tag::new(0x0010, 0x0010), "PatientName"),
    (Tag::new(0x0010, 0x0020), "PatientID"),
    (Tag::new(0x0010, 0x0030), "PatientBirthDate"),
    (Tag::new(0x0010, 0x0040), "PatientSex"),
    (Tag::new(0x0010, 0x1000), "OtherPatientIDs"),
    (Tag::new(0x0010, 0x1010), "PatientAge"),
    (Tag::new(0x0010, 0x1040), "PatientAddress"),
    (Tag::new(0x0018, 0x0015), "BodyPartExamined"),
    (Tag::new(0x0018, 0x1000), "DeviceSerialNumber"),
    (Tag::new(0x0020, 0x000D), "StudyInstanceUID"),
    (Tag::new(0x0020, 0x000E), "SeriesInstanceUID"),
    (Tag::new(0x0020, 0x0010), "StudyID"),
    (Tag::new(0x0020, 0x0011), "SeriesNumber"),
    (Tag::new(0x0020, 0x0013), "InstanceNumber"),
    (Tag::new(0x0028, 0x0002), "SamplesPerPixel"),
    (Tag::new(0x0028, 0x0004), "PhotometricInterpretation"),
    (Tag::new(0x0028, 0x0010), "Rows"),
    (Tag::new(0x0028, 0x0011), "Columns"),
    (Tag::new(0x0028, 0x0100), "BitsAllocated"),
    (Tag::new(0x0028, 0x0101), "BitsStored"),
    (Tag::new(0x0028, 0x0102), "HighBit"),
    (Tag::new(0x0028, 0x0103), "PixelRepresentation"),
    (Tag::new(0x7FE0, 0x0010), "PixelData"),
];

/// Resolve a standard keyword (case-insensitive) to its tag.
pub fn tag_for(keyword: &str) -> Option<Tag> {
    ENTRIES
        .iter()
        .find(|(_, kw)| kw.eq_ignore_ascii_case(keyword))
        .map(|(tag, _)| *tag)
}

/// Keyword for a tag, if known.
pub fn keyword_for(tag: Tag) -> Option<&'static str> {
    ENTRIES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, kw)| *kw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(tag_for("PatientName"), Some(Tag::new(0x0010, 0x0010)));
        assert_eq!(tag_for("PATIENTNAME"), Some(Tag::new(0x0010, 0x0010)));
        assert_eq!(tag_for("NoSuchKeyword"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(keyword_for(Tag::new(0x7FE0, 0x0010)), Some("PixelData"));
        assert_eq!(keyword_for(Tag::new(0x0009, 0x0001)), None);
    }
}
