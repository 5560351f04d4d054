//! Record header layouts (ANSI and ISO variants only).
//!
//! An ANSI header reads as: identification (8 bytes), record length (2 bytes,
//! or 6 when the first two are zero), CBEFF product (4 bytes), capture
//! details (12 bytes). An ISO header has a plain four-byte length and no
//! product.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use zerocopy::{
    FromBytes, IntoBytes,
    byteorder::big_endian::{U16, U32},
};

use super::{FieldOverflow, fits};

/// Format identifier expected in every record header.
pub const FORMAT_ID: [u8; 4] = *b"FMR\0";
/// Specification version expected in every record header.
pub const SPEC_VERSION: [u8; 4] = *b" 20\0";

/// ANSI header length with the two-byte record length.
pub const ANSI_HEADER_LENGTH: u32 = 26;
/// ANSI header length with the six-byte record length.
pub const ANSI_LARGE_HEADER_LENGTH: u32 = 30;
/// ISO header length.
pub const ISO_HEADER_LENGTH: u32 = 24;

/// Format identifier and specification version.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes)]
pub struct Identification {
    pub format_id: [u8; 4],
    pub spec_version: [u8; 4],
}

impl Identification {
    pub fn parse(r: [u8; 8]) -> Self {
        zerocopy::transmute!(r)
    }

    pub fn emit(&self) -> [u8; 8] {
        zerocopy::transmute!(*self)
    }
}

/// Decode a two-byte ANSI record length.
///
/// Returns the length, or where the field holds the zero sentinel, a state
/// token to decode the four-byte length that follows.
pub fn ansi_length(r: [u8; 2]) -> Either<u32, LongLength> {
    match u16::from_be_bytes(r) {
        0 => Right(LongLength(())),
        length => Left(u32::from(length)),
    }
}

/// State token to decode the four-byte ANSI record length.
#[derive(Debug)]
pub struct LongLength(());

impl LongLength {
    /// Transition out of the sentinel by decoding the four-byte length.
    pub fn advance(self, r: [u8; 4]) -> u32 {
        u32::from_be_bytes(r)
    }
}

/// Encode an ANSI record length.
///
/// Lengths from 1 to `u16::MAX` take the two-byte form. Anything else is
/// written as the zero sentinel followed by four bytes.
pub fn emit_ansi_length(length: u32) -> Either<[u8; 2], [u8; 6]> {
    match u16::try_from(length) {
        Ok(short) if short != 0 => Left(short.to_be_bytes()),
        _ => {
            let mut r = [0; 6];
            r[2..].copy_from_slice(&length.to_be_bytes());
            Right(r)
        }
    }
}

/// Decode a four-byte ISO record length.
pub fn iso_length(r: [u8; 4]) -> u32 {
    let length: U32 = zerocopy::transmute!(r);
    length.get()
}

/// Encode a four-byte ISO record length.
pub fn emit_iso_length(length: u32) -> [u8; 4] {
    zerocopy::transmute!(U32::new(length))
}

/// CBEFF product identifier (ANSI only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Product {
    pub owner: u16,
    pub kind: u16,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct ProductLayout {
    owner: U16,
    kind: U16,
}

impl Product {
    pub fn parse(r: [u8; 4]) -> Self {
        let ProductLayout { owner, kind } = zerocopy::transmute!(r);

        Self {
            owner: owner.get(),
            kind: kind.get(),
        }
    }

    pub fn emit(&self) -> [u8; 4] {
        zerocopy::transmute!(ProductLayout {
            owner: U16::new(self.owner),
            kind: U16::new(self.kind),
        })
    }
}

bitfield! {
    struct Equipment(u16) {
        [0..12] scanner_id: u16,
        [12..16] compliance: u8,
    }
}

/// Capture details closing every record header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capture {
    pub compliance: u8,
    pub scanner_id: u16,
    pub x_image_size: u16,
    pub y_image_size: u16,
    pub x_resolution: u16,
    pub y_resolution: u16,
    pub num_views: u8,
    pub reserved: u8,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct CaptureLayout {
    equipment: U16,
    x_image_size: U16,
    y_image_size: U16,
    x_resolution: U16,
    y_resolution: U16,
    num_views: u8,
    reserved: u8,
}

impl Capture {
    pub fn parse(r: [u8; 12]) -> Self {
        let CaptureLayout {
            equipment,
            x_image_size,
            y_image_size,
            x_resolution,
            y_resolution,
            num_views,
            reserved,
        } = zerocopy::transmute!(r);

        let equipment = Equipment(equipment.get());

        Self {
            compliance: equipment.compliance(),
            scanner_id: equipment.scanner_id(),
            x_image_size: x_image_size.get(),
            y_image_size: y_image_size.get(),
            x_resolution: x_resolution.get(),
            y_resolution: y_resolution.get(),
            num_views,
            reserved,
        }
    }

    pub fn emit(&self) -> Result<[u8; 12], FieldOverflow> {
        fits("compliance", self.compliance, 4)?;
        fits("scanner_id", self.scanner_id, 12)?;

        let mut equipment = Equipment(0);
        equipment.set_scanner_id(self.scanner_id);
        equipment.set_compliance(self.compliance);

        Ok(zerocopy::transmute!(CaptureLayout {
            equipment: U16::new(equipment.0),
            x_image_size: U16::new(self.x_image_size),
            y_image_size: U16::new(self.y_image_size),
            x_resolution: U16::new(self.x_resolution),
            y_resolution: U16::new(self.y_resolution),
            num_views: self.num_views,
            reserved: self.reserved,
        }))
    }
}
