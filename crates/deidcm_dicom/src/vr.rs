//! Value representations
//!
//! The subset of DICOM VRs the codec handles. Enough for header
//! de-identification: all common text and numeric VRs, the binary
//! blobs (OB/OW/UN), and SQ for nested sequences.

use crate::error::{DicomError, Result};
use crate::tag::Tag;

/// Value representation of a data element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vr {
    Ae,
    As,
    Cs,
    Da,
    Ds,
    Dt,
    Fd,
    Fl,
    Is,
    Lo,
    Lt,
    Ob,
    Ow,
    Pn,
    Sh,
    Sl,
    Sq,
    Ss,
    St,
    Tm,
    Ui,
    Ul,
    Un,
    Us,
    Ut,
}

impl Vr {
    /// Parse the two-byte VR code from an explicit-VR stream.
    pub fn from_bytes(tag: Tag, bytes: [u8; 2]) -> Result<Self> {
        match &bytes {
            b"AE" => Ok(Vr::Ae),
            b"AS" => Ok(Vr::As),
            b"CS" => Ok(Vr::Cs),
            b"DA" => Ok(Vr::Da),
            b"DS" => Ok(Vr::Ds),
            b"DT" => Ok(Vr::Dt),
            b"FD" => Ok(Vr::Fd),
            b"FL" => Ok(Vr::Fl),
            b"IS" => Ok(Vr::Is),
            b"LO" => Ok(Vr::Lo),
            b"LT" => Ok(Vr::Lt),
            b"OB" => Ok(Vr::Ob),
            b"OW" => Ok(Vr::Ow),
            b"PN" => Ok(Vr::Pn),
            b"SH" => Ok(Vr::Sh),
            b"SL" => Ok(Vr::Sl),
            b"SQ" => Ok(Vr::Sq),
            b"SS" => Ok(Vr::Ss),
            b"ST" => Ok(Vr::St),
            b"TM" => Ok(Vr::Tm),
            b"UI" => Ok(Vr::Ui),
            b"UL" => Ok(Vr::Ul),
            b"UN" => Ok(Vr::Un),
            b"US" => Ok(Vr::Us),
            b"UT" => Ok(Vr::Ut),
            _ => Err(DicomError::UnknownVr {
                tag: tag.to_string(),
                vr: bytes,
            }),
        }
    }

    /// Two-byte VR code as written on the wire.
    pub fn as_bytes(self) -> [u8; 2] {
        match self {
            Vr::Ae => *b"AE",
            Vr::As => *b"AS",
            Vr::Cs => *b"CS",
            Vr::Da => *b"DA",
            Vr::Ds => *b"DS",
            Vr::Dt => *b"DT",
            Vr::Fd => *b"FD",
            Vr::Fl => *b"FL",
            Vr::Is => *b"IS",
            Vr::Lo => *b"LO",
            Vr::Lt => *b"LT",
            Vr::Ob => *b"OB",
            Vr::Ow => *b"OW",
            Vr::Pn => *b"PN",
            Vr::Sh => *b"SH",
            Vr::Sl => *b"SL",
            Vr::Sq => *b"SQ",
            Vr::Ss => *b"SS",
            Vr::St => *b"ST",
            Vr::Tm => *b"TM",
            Vr::Ui => *b"UI",
            Vr::Ul => *b"UL",
            Vr::Un => *b"UN",
            Vr::Us => *b"US",
            Vr::Ut => *b"UT",
        }
    }

    /// VRs that use the long length form on the wire
    /// (2 reserved bytes + u32 length instead of u16 length).
    pub fn is_long_form(self) -> bool {
        matches!(self, Vr::Ob | Vr::Ow | Vr::Sq | Vr::Un | Vr::Ut)
    }

    /// VRs whose values are character strings.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Vr::Ae
                | Vr::As
                | Vr::Cs
                | Vr::Da
                | Vr::Ds
                | Vr::Dt
                | Vr::Is
                | Vr::Lo
                | Vr::Lt
                | Vr::Pn
                | Vr::Sh
                | Vr::St
                | Vr::Tm
                | Vr::Ui
                | Vr::Ut
        )
    }

    /// Byte used to pad odd-length values to even length.
    /// UI values pad with NUL, other text with space.
    pub fn pad_byte(self) -> u8 {
        match self {
            Vr::Ui => 0x00,
            _ => b' ',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_codes() {
        for code in [b"PN", b"SQ", b"OB", b"UI", b"US"] {
            let vr = Vr::from_bytes(Tag::new(0, 0), *code).unwrap();
            assert_eq!(&vr.as_bytes(), code);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert!(Vr::from_bytes(Tag::new(0x10, 0x10), *b"ZZ").is_err());
    }

    #[test]
    fn test_long_form() {
        assert!(Vr::Sq.is_long_form());
        assert!(Vr::Ob.is_long_form());
        assert!(!Vr::Pn.is_long_form());
    }
}
