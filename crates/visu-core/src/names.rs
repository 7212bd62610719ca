//! Fixed-width packed variable-name tables.
//!
//! The solver returns variable names as a single character buffer made of
//! 255-byte slots, one per name, padded with spaces:
//!
//! ```text
//! [255 bytes] "Density       ...   "
//! [255 bytes] "Velocity      ...   "
//! ...
//! ```
//!
//! A name ends at the first space (or NUL) in its slot.

use crate::error::MarshalError;

/// Width in bytes of one name slot.
pub const NAME_SLOT_WIDTH: usize = 255;

/// A borrowed view over a packed name table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedNameTable<'a> {
    bytes: &'a [u8],
}

impl<'a> PackedNameTable<'a> {
    /// Wrap a raw buffer, checking that it splits into whole slots.
    pub fn new(bytes: &'a [u8]) -> Result<Self, MarshalError> {
        if bytes.len() % NAME_SLOT_WIDTH != 0 {
            return Err(MarshalError::MalformedNameTable {
                len: bytes.len(),
                slot_width: NAME_SLOT_WIDTH,
            });
        }
        Ok(Self { bytes })
    }

    /// An empty table (no variables selected).
    pub const fn empty() -> Self {
        Self { bytes: &[] }
    }

    /// Number of names in the table.
    pub fn len(&self) -> usize {
        self.bytes.len() / NAME_SLOT_WIDTH
    }

    /// Returns `true` if the table holds no names.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the name in slot `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<Result<&'a str, MarshalError>> {
        let bytes: &'a [u8] = self.bytes;
        let start = index.checked_mul(NAME_SLOT_WIDTH)?;
        let slot = bytes.get(start..start + NAME_SLOT_WIDTH)?;
        Some(decode_slot(index, slot))
    }

    /// Iterate over decoded names in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Result<&'a str, MarshalError>> + 'a {
        let bytes: &'a [u8] = self.bytes;
        bytes
            .chunks_exact(NAME_SLOT_WIDTH)
            .enumerate()
            .map(|(i, slot)| decode_slot(i, slot))
    }

    /// Decode every name, failing on the first malformed slot.
    pub fn decode(&self) -> Result<Vec<String>, MarshalError> {
        self.iter().map(|r| r.map(str::to_owned)).collect()
    }

    /// Build a packed table from names, space-padding each slot.
    ///
    /// Rejects names that are empty, longer than a slot, or that contain a
    /// space or NUL (they would not survive a decode).
    pub fn encode<I, S>(names: I) -> Result<Vec<u8>, MarshalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for (index, name) in names.into_iter().enumerate() {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(MarshalError::EmptyName { index });
            }
            if name.len() > NAME_SLOT_WIDTH {
                return Err(MarshalError::NameTooLong {
                    name: name.to_owned(),
                    slot_width: NAME_SLOT_WIDTH,
                });
            }
            if name.bytes().any(|b| b == b' ' || b == 0) {
                return Err(MarshalError::InvalidName { index });
            }
            out.extend_from_slice(name.as_bytes());
            out.resize(out.len() + NAME_SLOT_WIDTH - name.len(), b' ');
        }
        Ok(out)
    }
}

fn decode_slot(index: usize, slot: &[u8]) -> Result<&str, MarshalError> {
    let end = slot
        .iter()
        .position(|&b| b == b' ' || b == 0)
        .unwrap_or(slot.len());
    if end == 0 {
        return Err(MarshalError::EmptyName { index });
    }
    std::str::from_utf8(&slot[..end]).map_err(|_| MarshalError::InvalidName { index })
}
