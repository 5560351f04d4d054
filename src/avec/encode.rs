//! Writer-based encoder implementation.
//!
//! Declared fields (lengths, counts, reserved bits) are written as stored
//! rather than recomputed, so a decoded record encodes back to the bytes it
//! came from. Use [`Record::computed_length`] to refresh a record length after
//! editing a tree by hand.

use std::io::Write;

use either::Either::{Left, Right};
use log::debug;

use crate::{
    record::{CoreDeltaBlock, ExtendedDataBlock, ExtendedPayload, FingerView, Record, Variant},
    sans::{
        extended::{DataHeader, LandmarkInfo, LandmarkPosition, emit_ridge_count},
        header::{Capture, Identification, Product, emit_ansi_length, emit_iso_length},
        minutia::{emit_compact_card, emit_normal_card, emit_record},
        view::ViewHeader,
    },
};

use super::Error;

/// Encode a record to a writer.
///
/// This method is also re-exported as `minutiae::avec::encode`.
pub fn encode(record: &Record, w: &mut impl Write) -> Result<(), Error> {
    let variant = record.variant;

    if variant.is_card() {
        let [view] = record.views.as_slice() else {
            return Err(Error::CardViewCount(record.views.len()));
        };

        for m in &view.minutiae {
            match variant {
                Variant::IsoCompactCard => w.write_all(&emit_compact_card(m)?)?,
                _ => w.write_all(&emit_normal_card(m)?)?,
            }
        }
    } else {
        header(record, w)?;

        for view in &record.views {
            finger_view(view, variant, w)?;
        }
    }

    debug!(
        "Encoded {variant} record of {} views, declaring {} bytes.",
        record.views.len(),
        record.record_length
    );

    Ok(())
}

/// Encode a record to a new buffer.
///
/// This method is also re-exported as `minutiae::avec::encode_vec`.
pub fn encode_vec(record: &Record) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve(record.computed_length() as usize)?;

    encode(record, &mut buf)?;

    Ok(buf)
}

fn header(record: &Record, w: &mut impl Write) -> Result<(), Error> {
    w.write_all(
        &Identification {
            format_id: record.format_id,
            spec_version: record.spec_version,
        }
        .emit(),
    )?;

    if record.variant == Variant::Ansi {
        match emit_ansi_length(record.record_length) {
            Left(short) => w.write_all(&short)?,
            Right(long) => w.write_all(&long)?,
        }

        w.write_all(
            &Product {
                owner: record.product_owner,
                kind: record.product_type,
            }
            .emit(),
        )?;
    } else {
        w.write_all(&emit_iso_length(record.record_length))?;
    }

    w.write_all(
        &Capture {
            compliance: record.compliance,
            scanner_id: record.scanner_id,
            x_image_size: record.x_image_size,
            y_image_size: record.y_image_size,
            x_resolution: record.x_resolution,
            y_resolution: record.y_resolution,
            num_views: record.num_views,
            reserved: record.reserved,
        }
        .emit()?,
    )?;

    Ok(())
}

fn finger_view(view: &FingerView, variant: Variant, w: &mut impl Write) -> Result<(), Error> {
    w.write_all(
        &ViewHeader {
            position: view.position,
            view_number: view.view_number,
            impression: view.impression,
            quality: view.quality,
            num_minutiae: view.num_minutiae,
        }
        .emit()?,
    )?;

    for m in &view.minutiae {
        w.write_all(&emit_record(m)?)?;
    }

    match &view.extended {
        Some(block) => extended_block(block, variant, w),
        None => Ok(w.write_all(&0u16.to_be_bytes())?),
    }
}

fn extended_block(
    block: &ExtendedDataBlock,
    variant: Variant,
    w: &mut impl Write,
) -> Result<(), Error> {
    w.write_all(&block.block_length.to_be_bytes())?;

    for data in &block.records {
        w.write_all(
            &DataHeader {
                type_id: data.type_id(),
                length: data.length,
            }
            .emit(),
        )?;

        match &data.payload {
            ExtendedPayload::RidgeCount(b) => {
                w.write_all(&[b.method])?;

                for c in &b.counts {
                    w.write_all(&emit_ridge_count(c))?;
                }
            }
            ExtendedPayload::CoreDelta(b) => core_deltas(b, variant, w)?,
            ExtendedPayload::Opaque { data, .. } => w.write_all(data)?,
        }
    }

    Ok(())
}

fn core_deltas(block: &CoreDeltaBlock, variant: Variant, w: &mut impl Write) -> Result<(), Error> {
    let cores = LandmarkInfo {
        kind: block.core_type,
        count: block.num_cores,
    };
    w.write_all(&cores.emit_cores(variant)?)?;

    for core in &block.cores {
        let position = LandmarkPosition {
            kind: core.kind,
            x: core.x,
            y: core.y,
        };
        w.write_all(&position.emit(variant)?)?;

        if block.core_is_angular(core, variant) {
            w.write_all(&[core.angle.unwrap_or_default()])?;
        }
    }

    let deltas = LandmarkInfo {
        kind: block.delta_type,
        count: block.num_deltas,
    };
    w.write_all(&deltas.emit_deltas(variant)?)?;

    for delta in &block.deltas {
        let position = LandmarkPosition {
            kind: delta.kind,
            x: delta.x,
            y: delta.y,
        };
        w.write_all(&position.emit(variant)?)?;

        if block.delta_is_angular(delta, variant) {
            w.write_all(&delta.angles.unwrap_or_default())?;
        }
    }

    Ok(())
}
