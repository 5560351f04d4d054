//! Hand-built record bytes shared by the integration tests.

#![allow(dead_code)]

/// A ridge ending at (100, 200), angle 45, quality 60.
pub const RIDGE_ENDING: [u8; 6] = [0x40, 0x64, 0x00, 0xC8, 45, 60];
/// A bifurcation at (50, 50), angle 90, quality 70.
pub const BIFURCATION: [u8; 6] = [0x80, 0x32, 0x00, 0x32, 90, 70];

/// Ridge counts between minutiae 1 and 2 (5 ridges) and 2 and 1 (7 ridges).
pub const RIDGE_COUNTS: [u8; 11] = [0x00, 0x01, 0x00, 11, 1, 1, 2, 5, 2, 1, 7];

/// ANSI core/delta data: one angular core at (100, 200) with angle 30, and one
/// non-angular delta at (50, 50).
pub const ANSI_CORE_DELTA: [u8; 15] = [
    0x00, 0x02, 0x00, 15, // header
    0x41, 0x00, 0x64, 0x00, 0xC8, 30, // angular core
    0x01, 0x00, 0x32, 0x00, 0x32, // non-angular delta
];

/// Vendor data of an unknown type.
pub const OPAQUE: [u8; 6] = [0x01, 0x00, 0x00, 6, 0xAA, 0xBB];

/// Capture details: compliance 8, scanner 0x123, a 400x500 image at 197
/// pixels per centimetre.
fn capture(num_views: u8) -> Vec<u8> {
    vec![
        0x81, 0x23, 0x01, 0x90, 0x01, 0xF4, 0x00, 0xC5, 0x00, 0xC5, num_views, 0,
    ]
}

/// Encode a view from its header fields, minutiae, and extended records.
pub fn view(
    position: u8,
    view_number: u8,
    minutiae: &[[u8; 6]],
    extended: &[&[u8]],
) -> Vec<u8> {
    let mut buf = vec![position, view_number << 4, 80, minutiae.len() as u8];

    for m in minutiae {
        buf.extend_from_slice(m);
    }

    let block: Vec<u8> = extended.concat();
    buf.extend_from_slice(&(block.len() as u16).to_be_bytes());
    buf.extend_from_slice(&block);

    buf
}

/// Encode an ANSI record around views, declaring its true length.
pub fn ansi_record(views: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = views.concat();
    let length = 26 + body.len() as u16;

    let mut buf = Vec::new();
    buf.extend_from_slice(b"FMR\0 20\0");
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x0F, 0x00, 0x01]);
    buf.extend_from_slice(&capture(views.len() as u8));
    buf.extend_from_slice(&body);

    buf
}

/// Encode an ISO record around views, declaring its true length.
pub fn iso_record(views: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = views.concat();
    let length = 24 + body.len() as u32;

    let mut buf = Vec::new();
    buf.extend_from_slice(b"FMR\0 20\0");
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&capture(views.len() as u8));
    buf.extend_from_slice(&body);

    buf
}

/// An ANSI record of one view with two minutiae and all three kinds of
/// extended data.
pub fn full_ansi_record() -> Vec<u8> {
    ansi_record(&[view(
        1,
        0,
        &[RIDGE_ENDING, BIFURCATION],
        &[&RIDGE_COUNTS, &ANSI_CORE_DELTA, &OPAQUE],
    )])
}

/// An ANSI record of one view with one minutia and no extended data.
pub fn simple_ansi_record() -> Vec<u8> {
    ansi_record(&[view(1, 0, &[RIDGE_ENDING], &[])])
}
