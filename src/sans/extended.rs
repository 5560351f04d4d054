//! Extended data layouts: the block length, record headers, and the ridge
//! count and core/delta payloads.
//!
//! Core/delta layouts differ by variant. ANSI packs one type for all cores
//! (and one for all deltas) above the count, while ISO keeps the count alone
//! and stores a type in the high bits of each entry's x word. The variant is
//! always passed in explicitly.

use tartan_bitfield::bitfield;
use zerocopy::{FromBytes, IntoBytes, byteorder::big_endian::U16};

use super::{FieldOverflow, fits};
use crate::record::{RidgeCount, Variant};

/// Length of the field announcing an extended data block.
pub const BLOCK_LENGTH_FIELD: u32 = 2;
/// Length of the type and length header opening each extended data record.
pub const DATA_HEADER_LENGTH: u16 = 4;

/// Type identifier of ridge count data.
pub const RIDGE_COUNT_TYPE: u16 = 0x0001;
/// Type identifier of core and delta data.
pub const CORE_DELTA_TYPE: u16 = 0x0002;

/// Length of a ridge count entry.
pub const RIDGE_COUNT_LENGTH: usize = 3;

/// Core or delta type code marking entries that carry angles.
pub const ANGULAR: u8 = 1;

/// Whether cores of a type are followed by an angle.
pub fn core_is_angular(kind: u8) -> bool {
    kind == ANGULAR
}

/// Whether deltas of a type are followed by three angles.
pub fn delta_is_angular(kind: u8) -> bool {
    kind == ANGULAR
}

/// Decode the length of an extended data block. Zero means no block.
pub fn block_length(r: [u8; 2]) -> u16 {
    u16::from_be_bytes(r)
}

/// Type and length of one extended data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    pub type_id: u16,
    /// Length of the record, including this header.
    pub length: u16,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct DataHeaderLayout {
    type_id: U16,
    length: U16,
}

impl DataHeader {
    pub fn parse(r: [u8; 4]) -> Self {
        let DataHeaderLayout { type_id, length } = zerocopy::transmute!(r);

        Self {
            type_id: type_id.get(),
            length: length.get(),
        }
    }

    pub fn emit(&self) -> [u8; 4] {
        zerocopy::transmute!(DataHeaderLayout {
            type_id: U16::new(self.type_id),
            length: U16::new(self.length),
        })
    }
}

/// Decode one ridge count entry.
pub fn parse_ridge_count(r: [u8; 3]) -> RidgeCount {
    let [index_one, index_two, count] = r;

    RidgeCount {
        index_one,
        index_two,
        count,
    }
}

pub fn emit_ridge_count(c: &RidgeCount) -> [u8; 3] {
    [c.index_one, c.index_two, c.count]
}

bitfield! {
    struct CoreInfo(u8) {
        [0..4] count: u8,
        [6..8] kind: u8,
    }
}

bitfield! {
    struct DeltaInfo(u8) {
        [0..6] count: u8,
        [6..8] kind: u8,
    }
}

/// The type and count byte opening the cores or the deltas of a block.
///
/// ISO records carry no type here, and `kind` is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandmarkInfo {
    pub kind: u8,
    pub count: u8,
}

impl LandmarkInfo {
    pub fn parse_cores(r: [u8; 1], variant: Variant) -> Self {
        let info = CoreInfo(r[0]);

        Self {
            kind: if variant.is_iso_family() { 0 } else { info.kind() },
            count: info.count(),
        }
    }

    pub fn parse_deltas(r: [u8; 1], variant: Variant) -> Self {
        let info = DeltaInfo(r[0]);

        Self {
            kind: if variant.is_iso_family() { 0 } else { info.kind() },
            count: info.count(),
        }
    }

    pub fn emit_cores(&self, variant: Variant) -> Result<[u8; 1], FieldOverflow> {
        fits("core count", self.count, 4)?;

        let mut info = CoreInfo(0);
        info.set_count(self.count);
        if !variant.is_iso_family() {
            fits("core type", self.kind, 2)?;
            info.set_kind(self.kind);
        }

        Ok([info.0])
    }

    pub fn emit_deltas(&self, variant: Variant) -> Result<[u8; 1], FieldOverflow> {
        fits("delta count", self.count, 6)?;

        let mut info = DeltaInfo(0);
        info.set_count(self.count);
        if !variant.is_iso_family() {
            fits("delta type", self.kind, 2)?;
            info.set_kind(self.kind);
        }

        Ok([info.0])
    }
}

bitfield! {
    struct Coordinate(u16) {
        [0..14] value: u16,
        [14..16] high: u8,
    }
}

/// The position words of a core or delta entry.
///
/// `kind` holds the high bits of the x word, a per-entry type under ISO and
/// unused under ANSI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandmarkPosition {
    pub kind: u8,
    pub x: u16,
    pub y: u16,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct PositionLayout {
    x: U16,
    y: U16,
}

impl LandmarkPosition {
    pub fn parse(r: [u8; 4]) -> Self {
        let PositionLayout { x, y } = zerocopy::transmute!(r);
        let x = Coordinate(x.get());
        let y = Coordinate(y.get());

        Self {
            kind: x.high(),
            x: x.value(),
            y: y.value(),
        }
    }

    /// Encode, writing `kind` into the x word only for ISO variants.
    pub fn emit(&self, variant: Variant) -> Result<[u8; 4], FieldOverflow> {
        fits("landmark x", self.x, 14)?;
        fits("landmark y", self.y, 14)?;

        let mut x = Coordinate(0);
        x.set_value(self.x);
        if variant.is_iso_family() {
            fits("landmark type", self.kind, 2)?;
            x.set_high(self.kind);
        }

        let mut y = Coordinate(0);
        y.set_value(self.y);

        Ok(zerocopy::transmute!(PositionLayout {
            x: U16::new(x.0),
            y: U16::new(y.0),
        }))
    }
}
