//! Extended data carried after a view's minutiae.

use crate::sans::{
    FieldOverflow,
    extended::{
        CORE_DELTA_TYPE, DATA_HEADER_LENGTH, RIDGE_COUNT_TYPE, core_is_angular, delta_is_angular,
    },
};

use super::Variant;

/// The extended data block of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedDataBlock {
    /// Declared length of all records in the block, in bytes.
    pub block_length: u16,
    pub records: Vec<ExtendedData>,
    /// Set when the stream ended before this block was fully read.
    pub partial: bool,
}

impl ExtendedDataBlock {
    /// Sum of the declared lengths of the records present.
    pub fn records_length(&self) -> u32 {
        self.records.iter().map(|r| u32::from(r.length)).sum()
    }
}

/// One typed record within an extended data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedData {
    /// Declared length, including the four-byte type and length header.
    pub length: u16,
    pub payload: ExtendedPayload,
    /// Set when the stream ended before this record was fully read.
    pub partial: bool,
}

impl ExtendedData {
    /// Wrap a payload, declaring the length its contents encode to.
    ///
    /// Fails when the record would not fit the two-byte length field.
    pub fn new(payload: ExtendedPayload, variant: Variant) -> Result<Self, FieldOverflow> {
        let length = usize::from(DATA_HEADER_LENGTH) + payload.encoded_length(variant);

        let Ok(length) = u16::try_from(length) else {
            return Err(FieldOverflow {
                field: "extended data length",
                value: u32::try_from(length).unwrap_or(u32::MAX),
                bits: 16,
            });
        };

        Ok(Self {
            length,
            payload,
            partial: false,
        })
    }

    /// The type identifier written ahead of the payload.
    pub fn type_id(&self) -> u16 {
        self.payload.type_id()
    }

    /// Payload bytes these contents encode to, excluding the header.
    pub fn payload_length(&self, variant: Variant) -> usize {
        self.payload.encoded_length(variant)
    }
}

/// Contents of an extended data record, selected by its type identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedPayload {
    RidgeCount(RidgeCountBlock),
    CoreDelta(CoreDeltaBlock),
    /// A record type without a dedicated decoder, kept as raw bytes.
    Opaque { type_id: u16, data: Vec<u8> },
}

impl ExtendedPayload {
    pub fn type_id(&self) -> u16 {
        match self {
            Self::RidgeCount(_) => RIDGE_COUNT_TYPE,
            Self::CoreDelta(_) => CORE_DELTA_TYPE,
            Self::Opaque { type_id, .. } => *type_id,
        }
    }

    fn encoded_length(&self, variant: Variant) -> usize {
        match self {
            Self::RidgeCount(b) => 1 + 3 * b.counts.len(),
            Self::CoreDelta(b) => {
                let cores: usize = b
                    .cores
                    .iter()
                    .map(|c| if b.core_is_angular(c, variant) { 5 } else { 4 })
                    .sum();
                let deltas: usize = b
                    .deltas
                    .iter()
                    .map(|d| if b.delta_is_angular(d, variant) { 7 } else { 4 })
                    .sum();
                2 + cores + deltas
            }
            Self::Opaque { data, .. } => data.len(),
        }
    }
}

/// Ridge counts between pairs of minutiae.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RidgeCountBlock {
    /// Extraction method code.
    pub method: u8,
    pub counts: Vec<RidgeCount>,
}

/// The number of ridges crossed between two minutiae.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RidgeCount {
    /// One-based index of the first minutia.
    pub index_one: u8,
    /// One-based index of the second minutia.
    pub index_two: u8,
    pub count: u8,
}

/// Core and delta landmarks.
///
/// ANSI records declare one type for all cores and one for all deltas,
/// stored here in `core_type` and `delta_type` and mirrored into each entry's
/// `kind`. ISO records carry a type per entry and leave the block types zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreDeltaBlock {
    pub core_type: u8,
    pub num_cores: u8,
    pub cores: Vec<Core>,
    pub delta_type: u8,
    pub num_deltas: u8,
    pub deltas: Vec<Delta>,
}

impl CoreDeltaBlock {
    /// Whether a core is encoded with its angle.
    pub fn core_is_angular(&self, core: &Core, variant: Variant) -> bool {
        match variant {
            Variant::Ansi => core_is_angular(self.core_type),
            _ => core_is_angular(core.kind),
        }
    }

    /// Whether a delta is encoded with its three angles.
    pub fn delta_is_angular(&self, delta: &Delta, variant: Variant) -> bool {
        match variant {
            Variant::Ansi => delta_is_angular(self.delta_type),
            _ => delta_is_angular(delta.kind),
        }
    }
}

/// A core point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Core {
    pub kind: u8,
    pub x: u16,
    pub y: u16,
    pub angle: Option<u8>,
}

/// A delta point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delta {
    pub kind: u8,
    pub x: u16,
    pub y: u16,
    pub angles: Option<[u8; 3]>,
}
