//! Slice-based decoder implementation.

use crate::{Record, Variant};

use super::{Decoded, Error, Records, decode, source::SliceSource};

/// Decode one record of a variant from the start of a slice.
///
/// This method is also re-exported as `minutiae::avec::decode_slice`.
pub fn decode(r: &[u8], variant: Variant) -> Result<Decoded<Record>, Error> {
    decode::record(&mut SliceSource::new(r), variant)
}

/// Iterate over the records of a variant stored back to back in a slice.
///
/// This method is also re-exported as `minutiae::avec::records_slice`.
pub fn records(r: &[u8], variant: Variant) -> Records<SliceSource<'_>> {
    Records::new(SliceSource::new(r), variant)
}
