//! Wire layouts, free of any reader or writer.
//!
//! Each submodule converts one fixed-size piece of a record between its
//! big-endian byte array and its fields. Nothing here decides how many pieces
//! to read or where they come from; that is the job of the [`crate::avec`]
//! module, which strings these layouts together over a byte source.
//!
//! Parsing never fails: every bit pattern of a fixed-size piece has a field
//! interpretation, and conformance is left to [`crate::validate`]. Emitting
//! fails with [`FieldOverflow`] when a field holds a value too wide for the
//! bits the layout gives it.
//!
//! Where a piece decides what follows it (the ANSI record length, which may
//! announce a wider length field), parsing returns an [`either::Either`] of
//! the value or a state token to advance with the next bytes.

use thiserror::Error;

pub mod extended;
pub mod header;
pub mod minutia;
pub mod view;

/// A field value too wide for its place in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Value {value} of field `{field}` does not fit in {bits} bits.")]
pub struct FieldOverflow {
    pub field: &'static str,
    pub value: u32,
    pub bits: u32,
}

/// Check that a value fits in a number of bits.
pub(crate) fn fits(field: &'static str, value: impl Into<u32>, bits: u32) -> Result<(), FieldOverflow> {
    let value = value.into();

    if bits < 32 && value >> bits != 0 {
        Err(FieldOverflow { field, value, bits })
    } else {
        Ok(())
    }
}
