//! In-memory header model
//!
//! A `DataSet` is a tag-ordered map of data elements. Sequence (SQ)
//! elements hold nested data sets, recursing to arbitrary depth.

use crate::tag::Tag;
use crate::vr::Vr;
use std::collections::btree_map::Values;
use std::collections::BTreeMap;

/// Value payload of a data element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Character-string VRs (PN, LO, DA, UI, ...)
    Text(String),
    /// Binary VRs (US, UL, OB, OW, ...), stored as raw little-endian bytes
    Bytes(Vec<u8>),
    /// SQ: a list of nested data sets
    Items(Vec<DataSet>),
}

impl Value {
    /// Encoded byte length of the value, before even-length padding.
    /// Sequences report 0; their length is computed at write time.
    pub fn byte_len(&self) -> usize {
        match self {
            Value::Text(s) => s.len(),
            Value::Bytes(b) => b.len(),
            Value::Items(_) => 0,
        }
    }
}

/// A single data element: tag, VR, value.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub vr: Vr,
    pub value: Value,
}

impl Element {
    pub fn new(tag: Tag, vr: Vr, value: Value) -> Self {
        Self { tag, vr, value }
    }

    /// Text element.
    pub fn text(tag: Tag, vr: Vr, value: impl Into<String>) -> Self {
        Self::new(tag, vr, Value::Text(value.into()))
    }

    /// Binary element from raw bytes.
    pub fn bytes(tag: Tag, vr: Vr, value: Vec<u8>) -> Self {
        Self::new(tag, vr, Value::Bytes(value))
    }

    /// US element from a 16-bit value.
    pub fn us(tag: Tag, value: u16) -> Self {
        Self::new(tag, Vr::Us, Value::Bytes(value.to_le_bytes().to_vec()))
    }

    /// UL element from a 32-bit value.
    pub fn ul(tag: Tag, value: u32) -> Self {
        Self::new(tag, Vr::Ul, Value::Bytes(value.to_le_bytes().to_vec()))
    }

    /// SQ element from nested items.
    pub fn sequence(tag: Tag, items: Vec<DataSet>) -> Self {
        Self::new(tag, Vr::Sq, Value::Items(items))
    }

    /// Nested items of an SQ element, if this is one.
    pub fn items(&self) -> Option<&[DataSet]> {
        match &self.value {
            Value::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable nested items of an SQ element.
    pub fn items_mut(&mut self) -> Option<&mut Vec<DataSet>> {
        match &mut self.value {
            Value::Items(items) => Some(items),
            _ => None,
        }
    }
}

/// An ordered collection of data elements.
///
/// Elements are kept sorted by tag, matching the on-disk ordering rule
/// for DICOM data sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    elements: BTreeMap<Tag, Element>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element, replacing any existing element with the same tag.
    pub fn put(&mut self, element: Element) {
        self.elements.insert(element.tag, element);
    }

    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    pub fn get_mut(&mut self, tag: Tag) -> Option<&mut Element> {
        self.elements.get_mut(&tag)
    }

    pub fn remove(&mut self, tag: Tag) -> Option<Element> {
        self.elements.remove(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// Iterate elements in ascending tag order.
    pub fn iter(&self) -> Values<'_, Tag, Element> {
        self.elements.values()
    }

    /// Tags present at this level, in ascending order.
    pub fn tags(&self) -> Vec<Tag> {
        self.elements.keys().copied().collect()
    }

    /// Keep only the elements for which the predicate holds.
    pub fn retain(&mut self, mut keep: impl FnMut(&Element) -> bool) {
        self.elements.retain(|_, elem| keep(elem));
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Element;
    type IntoIter = Values<'a, Tag, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Element> for DataSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut ds = DataSet::new();
        for elem in iter {
            ds.put(elem);
        }
        ds
    }
}
