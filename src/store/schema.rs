//! Fixed-width attribute layout for tuples in the [`RowStore`](super::row_store::RowStore).
//!
//! Attributes are appended in order and each one's byte offset is the sum
//! of the widths of the attributes before it.

/// Identifies one attribute's position within a tuple's byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrId(pub usize);

#[derive(Debug, Clone, Default)]
pub struct TupleSchema {
    widths: Vec<usize>,
    offsets: Vec<usize>,
}

impl TupleSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute of the given byte width and returns its id.
    pub fn add_attr(&mut self, width: usize) -> AttrId {
        let offset = self.widths.iter().sum();
        self.widths.push(width);
        self.offsets.push(offset);
        AttrId(self.widths.len() - 1)
    }

    pub fn attr_count(&self) -> usize {
        self.widths.len()
    }

    pub fn attr_width(&self, attr: AttrId) -> usize {
        self.widths[attr.0]
    }

    pub fn attr_offset(&self, attr: AttrId) -> usize {
        self.offsets[attr.0]
    }

    /// Total width of a tuple under this schema, in bytes.
    pub fn tuple_width(&self) -> usize {
        self.widths.iter().sum()
    }

    /// Reads a little-endian `u64` attribute out of a tuple's raw bytes.
    pub fn read_u64(&self, tuple: &[u8], attr: AttrId) -> u64 {
        let offset = self.attr_offset(attr);
        let width = self.attr_width(attr);
        debug_assert_eq!(width, 8, "read_u64 called on a non-8-byte attribute");
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&tuple[offset..offset + 8]);
        u64::from_le_bytes(buf)
    }
}
