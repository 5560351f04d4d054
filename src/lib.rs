//! A codec, validator and converter for finger minutiae records.
//!
//! Minutiae records (FMR) describe the ridge endings and bifurcations found
//! on one or more finger impressions. The same logical record travels in four
//! incompatible encodings, named here by [`Variant`]: ANSI INCITS 378, the ISO
//! 19794-2 record format, and the header-less ISO normal and compact card
//! formats.
//!
//! Most users should begin with the functions in the [`avec`] module, which
//! decode records from readers and slices and encode them to writers. Decoded
//! records can be checked for conformance with [`validate`], moved between
//! variants with [`convert`], and have their minutiae reordered or pruned
//! with the functions in [`select`]. The bit-level wire layouts live in the
//! [`sans`] module, for applications needing to work below the record tree.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `minex`: skip the CBEFF product owner check during validation, as MINEX
//!   conformance testing requires.

pub mod avec;
pub mod convert;
pub mod record;
pub mod sans;
pub mod select;
pub mod validate;

pub use convert::convert;
pub use record::{
    Core, CoreDeltaBlock, Delta, ExtendedData, ExtendedDataBlock, ExtendedPayload, FingerView,
    Minutia, Record, RidgeCount, RidgeCountBlock, Variant,
};
pub use validate::validate;
