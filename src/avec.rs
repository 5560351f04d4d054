//! Convenience interfaces for decoding and encoding whole records.
//!
//! The functions in this module decode records from readers and slices into
//! the [`Record`] tree, and encode trees back to any writer. Both decoding
//! backends drive the same decoder through the [`Source`] trait, so a file and
//! the same bytes in memory always decode identically.
//!
//! Decoding distinguishes three outcomes. A record read to its end is
//! [`Decoded::Complete`]. A stream ending part way through is
//! [`Decoded::Incomplete`], holding everything read so far, with the
//! interrupted view or extended data node attached and flagged `partial`.
//! Structurally impossible input is an [`Error::Malformed`], naming the
//! offset and node where decoding stopped.
//!
//! Decoding checks structure only. Field values outside their allowed ranges
//! are kept as read for [`crate::validate`] to report.
//!
//! [`Record`]: crate::Record

use std::collections::TryReserveError;

use thiserror::Error;

use crate::{Record, Variant, sans::FieldOverflow};

mod decode;
pub mod encode;
pub mod reader;
pub mod slice;
pub mod source;

pub use encode::{encode, encode_vec};
pub use reader::{decode as decode_reader, records as records_reader};
pub use slice::{decode as decode_slice, records as records_slice};
pub use source::Source;

/// The outcome of decoding a record that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    /// The record was read to its end.
    Complete(T),
    /// The stream ended inside the record; holds what was read.
    Incomplete(T),
}

impl<T> Decoded<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Borrow the decoded value, complete or not.
    pub fn get(&self) -> &T {
        match self {
            Self::Complete(t) | Self::Incomplete(t) => t,
        }
    }

    /// Take the decoded value, complete or not.
    pub fn into_inner(self) -> T {
        match self {
            Self::Complete(t) | Self::Incomplete(t) => t,
        }
    }

    /// Take the decoded value only if it is complete.
    pub fn complete(self) -> Option<T> {
        match self {
            Self::Complete(t) => Some(t),
            Self::Incomplete(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Self::Complete(t) => Decoded::Complete(f(t)),
            Self::Incomplete(t) => Decoded::Incomplete(f(t)),
        }
    }
}

/// Errors occurring while decoding or encoding.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader or writer.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The input cannot be a valid record structure.
    #[error("Malformed record at byte {offset} ({path}): {reason}")]
    Malformed {
        offset: usize,
        path: String,
        reason: Malformed,
    },
    /// A field value does not fit its place in the layout.
    #[error("Cannot encode record: {0}")]
    Overflow(#[from] FieldOverflow),
    /// A buffer for opaque data could not be reserved.
    #[error("Could not reserve memory for record data: {0}")]
    Allocation(#[from] TryReserveError),
    /// Card records carry exactly one view.
    #[error("Card records hold exactly one view, found {0}.")]
    CardViewCount(usize),
}

/// The reason a record is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformed {
    /// An extended data record declares a zero length.
    #[error("extended data record has zero length")]
    ZeroLength,
    /// An extended data record runs past the end of its block.
    #[error("extended data record of {length} bytes overruns the {remaining} bytes left in its block")]
    Overrun { length: u16, remaining: u32 },
    /// An extended data record is shorter than its own header.
    #[error("extended data record is shorter than its header")]
    TooShort,
    /// A ridge count payload is not a method byte and whole entries.
    #[error("ridge count data length is not a whole number of entries")]
    RidgeCountLength,
    /// Core and delta entries do not fill the declared payload exactly.
    #[error("core and delta data declares {declared} bytes but its entries take {consumed}")]
    CoreDeltaLength { declared: usize, consumed: usize },
    /// A card record holds more minutiae than a view can count.
    #[error("card record holds more than 255 minutiae")]
    TooManyMinutiae,
}

/// An iterator over the records of a stream holding several in sequence.
///
/// Iteration ends when the stream ends exactly between records. A record
/// cut short by the end of the stream is yielded as [`Decoded::Incomplete`]
/// and ends iteration; so does an error. Card records span to the end of the
/// stream, so at most one is yielded.
#[derive(Debug)]
pub struct Records<S> {
    source: S,
    variant: Variant,
    done: bool,
}

impl<S: Source> Records<S> {
    pub(crate) fn new(source: S, variant: Variant) -> Self {
        Self {
            source,
            variant,
            done: false,
        }
    }
}

impl<S: Source> Iterator for Records<S> {
    type Item = Result<Decoded<Record>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.source.at_end() {
            Ok(true) => {
                self.done = true;
                return None;
            }
            Ok(false) => {}
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        }

        let decoded = decode::record(&mut self.source, self.variant);

        self.done = self.variant.is_card() || !matches!(decoded, Ok(Decoded::Complete(_)));

        Some(decoded)
    }
}
