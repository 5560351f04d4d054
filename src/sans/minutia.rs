//! Minutia layouts for each variant.
//!
//! The record formats and the normal card format share two position words,
//! each holding a fourteen-bit coordinate under two high bits. The compact
//! card format squeezes a minutia into three bytes, with one-byte coordinates
//! and the type sharing a byte with a six-bit angle.

use tartan_bitfield::bitfield;
use zerocopy::{FromBytes, IntoBytes, byteorder::big_endian::U16};

use super::{FieldOverflow, fits};
use crate::record::Minutia;

/// Length of a minutia in the ANSI and ISO record formats.
pub const RECORD_MINUTIA_LENGTH: u32 = 6;
/// Length of a minutia in the ISO normal card format.
pub const NORMAL_CARD_MINUTIA_LENGTH: u32 = 5;
/// Length of a minutia in the ISO compact card format.
pub const COMPACT_CARD_MINUTIA_LENGTH: u32 = 3;

bitfield! {
    struct Position(u16) {
        [0..14] coordinate: u16,
        [14..16] high: u8,
    }
}

bitfield! {
    struct CompactDirection(u8) {
        [0..6] angle: u8,
        [6..8] kind: u8,
    }
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct RecordLayout {
    x: U16,
    y: U16,
    angle: u8,
    quality: u8,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct NormalCardLayout {
    x: U16,
    y: U16,
    angle: u8,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct CompactCardLayout {
    x: u8,
    y: u8,
    direction: u8,
}

fn split(x: U16, y: U16) -> (Position, Position) {
    (Position(x.get()), Position(y.get()))
}

fn join(m: &Minutia) -> Result<(U16, U16), FieldOverflow> {
    fits("minutia type", m.kind, 2)?;
    fits("minutia x", m.x, 14)?;
    fits("minutia reserved", m.reserved, 2)?;
    fits("minutia y", m.y, 14)?;

    let mut x = Position(0);
    x.set_high(m.kind);
    x.set_coordinate(m.x);

    let mut y = Position(0);
    y.set_high(m.reserved);
    y.set_coordinate(m.y);

    Ok((U16::new(x.0), U16::new(y.0)))
}

/// Decode a minutia in the ANSI and ISO record formats.
pub fn parse_record(r: [u8; 6]) -> Minutia {
    let RecordLayout {
        x,
        y,
        angle,
        quality,
    } = zerocopy::transmute!(r);
    let (x, y) = split(x, y);

    Minutia {
        kind: x.high(),
        x: x.coordinate(),
        y: y.coordinate(),
        angle,
        quality,
        reserved: y.high(),
    }
}

/// Encode a minutia in the ANSI and ISO record formats.
pub fn emit_record(m: &Minutia) -> Result<[u8; 6], FieldOverflow> {
    let (x, y) = join(m)?;

    Ok(zerocopy::transmute!(RecordLayout {
        x,
        y,
        angle: m.angle,
        quality: m.quality,
    }))
}

/// Decode a minutia in the ISO normal card format, which carries no quality.
pub fn parse_normal_card(r: [u8; 5]) -> Minutia {
    let NormalCardLayout { x, y, angle } = zerocopy::transmute!(r);
    let (x, y) = split(x, y);

    Minutia {
        kind: x.high(),
        x: x.coordinate(),
        y: y.coordinate(),
        angle,
        quality: 0,
        reserved: y.high(),
    }
}

/// Encode a minutia in the ISO normal card format. Quality is not written.
pub fn emit_normal_card(m: &Minutia) -> Result<[u8; 5], FieldOverflow> {
    let (x, y) = join(m)?;

    Ok(zerocopy::transmute!(NormalCardLayout {
        x,
        y,
        angle: m.angle,
    }))
}

/// Decode a minutia in the ISO compact card format.
pub fn parse_compact_card(r: [u8; 3]) -> Minutia {
    let CompactCardLayout { x, y, direction } = zerocopy::transmute!(r);
    let direction = CompactDirection(direction);

    Minutia {
        kind: direction.kind(),
        x: u16::from(x),
        y: u16::from(y),
        angle: direction.angle(),
        quality: 0,
        reserved: 0,
    }
}

/// Encode a minutia in the ISO compact card format. Quality and reserved
/// bits are not written.
pub fn emit_compact_card(m: &Minutia) -> Result<[u8; 3], FieldOverflow> {
    fits("minutia x", m.x, 8)?;
    fits("minutia y", m.y, 8)?;
    fits("minutia type", m.kind, 2)?;
    fits("minutia angle", m.angle, 6)?;

    let mut direction = CompactDirection(0);
    direction.set_kind(m.kind);
    direction.set_angle(m.angle);

    Ok(zerocopy::transmute!(CompactCardLayout {
        x: m.x as u8,
        y: m.y as u8,
        direction: direction.0,
    }))
}
