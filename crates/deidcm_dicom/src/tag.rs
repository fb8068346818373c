//! DICOM tag identifiers
//!
//! A tag is a (group, element) pair of 16-bit values. Policy files may
//! name tags either by hex literal (`(0010,0010)`, `0010,0010`,
//! `00100010`) or by standard keyword (`PatientName`); parsing of both
//! forms lives here, keyword resolution in [`crate::dict`].

use crate::dict;
use crate::error::{DicomError, Result};
use std::fmt;
use std::str::FromStr;

/// A DICOM data-element tag: (group, element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    pub group: u16,
    pub element: u16,
}

impl Tag {
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Odd group numbers mark vendor-defined (private) tags.
    pub fn is_private(&self) -> bool {
        self.group % 2 != 0
    }

    /// Standard keyword for this tag, if the dictionary knows it.
    pub fn keyword(&self) -> Option<&'static str> {
        dict::keyword_for(*self)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

impl FromStr for Tag {
    type Err = DicomError;

    /// Parse a tag from a policy-file identifier.
    ///
    /// Accepted forms: `(gggg,eeee)`, `gggg,eeee`, `ggggeeee`, or a
    /// standard keyword (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .unwrap_or(trimmed);

        if let Some((g, e)) = bare.split_once(',') {
            let group = u16::from_str_radix(g.trim(), 16)
                .map_err(|_| DicomError::InvalidTag(trimmed.to_string()))?;
            let element = u16::from_str_radix(e.trim(), 16)
                .map_err(|_| DicomError::InvalidTag(trimmed.to_string()))?;
            return Ok(Tag::new(group, element));
        }

        if bare.len() == 8 && bare.chars().all(|c| c.is_ascii_hexdigit()) {
            let group = u16::from_str_radix(&bare[..4], 16)
                .map_err(|_| DicomError::InvalidTag(trimmed.to_string()))?;
            let element = u16::from_str_radix(&bare[4..], 16)
                .map_err(|_| DicomError::InvalidTag(trimmed.to_string()))?;
            return Ok(Tag::new(group, element));
        }

        dict::tag_for(bare).ok_or_else(|| DicomError::UnknownKeyword(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paren_form() {
        let tag: Tag = "(0010,0010)".parse().unwrap();
        assert_eq!(tag, Tag::new(0x0010, 0x0010));
    }

    #[test]
    fn test_parse_bare_pair() {
        let tag: Tag = "0008,0018".parse().unwrap();
        assert_eq!(tag, Tag::new(0x0008, 0x0018));
    }

    #[test]
    fn test_parse_packed_hex() {
        let tag: Tag = "7FE00010".parse().unwrap();
        assert_eq!(tag, Tag::new(0x7FE0, 0x0010));
    }

    #[test]
    fn test_parse_keyword_case_insensitive() {
        let tag: Tag = "patientname".parse().unwrap();
        assert_eq!(tag, Tag::new(0x0010, 0x0010));
    }

    #[test]
    fn test_parse_unknown_keyword() {
        assert!("NotARealKeyword".parse::<Tag>().is_err());
    }

    #[test]
    fn test_private_group() {
        assert!(Tag::new(0x0009, 0x0001).is_private());
        assert!(!Tag::new(0x0010, 0x0010).is_private());
    }

    #[test]
    fn test_display() {
        assert_eq!(Tag::new(0x7FE0, 0x0010).to_string(), "(7FE0,0010)");
    }
}
