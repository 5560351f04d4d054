//! Reader-based decoder implementation.

use std::io::Read;

use crate::{Record, Variant};

use super::{Decoded, Error, Records, decode, source::ReaderSource};

/// Decode one record of a variant from a reader.
///
/// Reading stops at the end of the record; bytes after it are left in the
/// reader. Card records have no length and read to the end of the stream.
///
/// This method is also re-exported as `minutiae::avec::decode_reader`.
pub fn decode(r: &mut impl Read, variant: Variant) -> Result<Decoded<Record>, Error> {
    decode::record(&mut ReaderSource::new(r), variant)
}

/// Iterate over the records of a variant stored back to back in a reader.
///
/// This method is also re-exported as `minutiae::avec::records_reader`.
pub fn records<R: Read>(r: R, variant: Variant) -> Records<ReaderSource<R>> {
    Records::new(ReaderSource::new(r), variant)
}
