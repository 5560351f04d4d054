//! The record decoder shared by every source.

use either::Either::{Left, Right};
use log::{debug, warn};

use crate::{
    record::{
        Core, CoreDeltaBlock, Delta, ExtendedData, ExtendedDataBlock, ExtendedPayload, FingerView,
        Record, RidgeCountBlock, Variant,
    },
    sans::{
        extended::{
            CORE_DELTA_TYPE, DATA_HEADER_LENGTH, DataHeader, LandmarkInfo, LandmarkPosition,
            RIDGE_COUNT_LENGTH, RIDGE_COUNT_TYPE, block_length, parse_ridge_count,
        },
        header::{Capture, Identification, Product, ansi_length, iso_length},
        minutia::{parse_compact_card, parse_normal_card, parse_record},
        view::ViewHeader,
    },
};

use super::{
    Decoded, Error, Malformed,
    source::{Halt, Source},
};

/// Decode one record of a variant from a source.
pub(super) fn record<S: Source>(s: &mut S, variant: Variant) -> Result<Decoded<Record>, Error> {
    let start = s.offset();
    let mut record = Record::new(variant);

    let decoded = if variant.is_card() {
        settle(card(s, &mut record))?
    } else {
        settle(header(s, &mut record).and_then(|()| views(s, &mut record)))?
    };

    match decoded {
        Some(()) => {
            debug!(
                "Decoded {variant} record of {} views from bytes {start}..{}.",
                record.views.len(),
                s.offset()
            );
            Ok(Decoded::Complete(record))
        }
        None => {
            debug!(
                "Stream ended inside {variant} record at byte {}; {} views read.",
                s.offset(),
                record.views.len()
            );
            Ok(Decoded::Incomplete(record))
        }
    }
}

/// Separate the end of the stream from failures.
fn settle<T>(r: Result<T, Halt>) -> Result<Option<T>, Error> {
    match r {
        Ok(t) => Ok(Some(t)),
        Err(Halt::End) => Ok(None),
        Err(Halt::Failed(e)) => Err(e),
    }
}

fn malformed(offset: usize, path: String, reason: Malformed) -> Halt {
    warn!("Malformed record at byte {offset} ({path}): {reason}.");

    Halt::Failed(Error::Malformed {
        offset,
        path,
        reason,
    })
}

fn header<S: Source>(s: &mut S, record: &mut Record) -> Result<(), Halt> {
    let Identification {
        format_id,
        spec_version,
    } = Identification::parse(s.take()?);

    record.format_id = format_id;
    record.spec_version = spec_version;

    if record.variant == Variant::Ansi {
        record.record_length = match ansi_length(s.take()?) {
            Left(length) => length,
            Right(state) => state.advance(s.take()?),
        };

        let product = Product::parse(s.take()?);
        record.product_owner = product.owner;
        record.product_type = product.kind;
    } else {
        record.record_length = iso_length(s.take()?);
    }

    let capture = Capture::parse(s.take()?);
    record.compliance = capture.compliance;
    record.scanner_id = capture.scanner_id;
    record.x_image_size = capture.x_image_size;
    record.y_image_size = capture.y_image_size;
    record.x_resolution = capture.x_resolution;
    record.y_resolution = capture.y_resolution;
    record.num_views = capture.num_views;
    record.reserved = capture.reserved;

    Ok(())
}

fn views<S: Source>(s: &mut S, record: &mut Record) -> Result<(), Halt> {
    for index in 0..usize::from(record.num_views) {
        let start = s.offset();
        let mut view = FingerView::default();

        match finger_view(s, record.variant, &mut view, index) {
            Ok(()) => record.views.push(view),
            Err(Halt::End) => {
                if s.offset() > start {
                    view.partial = true;
                    record.views.push(view);
                }
                return Err(Halt::End);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn finger_view<S: Source>(
    s: &mut S,
    variant: Variant,
    view: &mut FingerView,
    index: usize,
) -> Result<(), Halt> {
    let header = ViewHeader::parse(s.take()?);
    view.position = header.position;
    view.view_number = header.view_number;
    view.impression = header.impression;
    view.quality = header.quality;
    view.num_minutiae = header.num_minutiae;

    for _ in 0..header.num_minutiae {
        view.minutiae.push(parse_record(s.take()?));
    }

    let block_length = block_length(s.take()?);

    if block_length == 0 {
        return Ok(());
    }

    let block = view.extended.insert(ExtendedDataBlock {
        block_length,
        ..Default::default()
    });

    match extended_records(s, variant, block, index) {
        Err(Halt::End) => {
            block.partial = true;
            Err(Halt::End)
        }
        r => r,
    }
}

fn extended_records<S: Source>(
    s: &mut S,
    variant: Variant,
    block: &mut ExtendedDataBlock,
    view: usize,
) -> Result<(), Halt> {
    let mut remaining = u32::from(block.block_length);

    while remaining > 0 {
        let offset = s.offset();
        let index = block.records.len();
        let path = || format!("view[{view}]/extended/data[{index}]");

        let DataHeader { type_id, length } = DataHeader::parse(s.take()?);

        if length == 0 {
            Err(malformed(offset, path(), Malformed::ZeroLength))?;
        }
        if u32::from(length) > remaining {
            Err(malformed(
                offset,
                path(),
                Malformed::Overrun { length, remaining },
            ))?;
        }
        if length < DATA_HEADER_LENGTH {
            Err(malformed(offset, path(), Malformed::TooShort))?;
        }

        remaining -= u32::from(length);

        let payload = match type_id {
            RIDGE_COUNT_TYPE => ExtendedPayload::RidgeCount(RidgeCountBlock::default()),
            CORE_DELTA_TYPE => ExtendedPayload::CoreDelta(CoreDeltaBlock::default()),
            _ => ExtendedPayload::Opaque {
                type_id,
                data: Vec::new(),
            },
        };

        block.records.push(ExtendedData {
            length,
            payload,
            partial: false,
        });
        let data = &mut block.records[index];

        let payload_length = usize::from(length - DATA_HEADER_LENGTH);

        let filled = match &mut data.payload {
            ExtendedPayload::RidgeCount(b) => ridge_counts(s, b, payload_length, offset, path),
            ExtendedPayload::CoreDelta(b) => {
                core_deltas(s, variant, b, payload_length, offset, path)
            }
            ExtendedPayload::Opaque { data, .. } => {
                s.take_vec(payload_length).map(|bytes| *data = bytes)
            }
        };

        data.partial = matches!(filled, Err(Halt::End));

        filled?;
    }

    Ok(())
}

fn ridge_counts<S: Source>(
    s: &mut S,
    block: &mut RidgeCountBlock,
    payload_length: usize,
    offset: usize,
    path: impl Fn() -> String,
) -> Result<(), Halt> {
    let Some(entries) = payload_length.checked_sub(1) else {
        return Err(malformed(offset, path(), Malformed::RidgeCountLength));
    };

    if entries % RIDGE_COUNT_LENGTH != 0 {
        return Err(malformed(offset, path(), Malformed::RidgeCountLength));
    }

    let [method] = s.take()?;
    block.method = method;

    for _ in 0..entries / RIDGE_COUNT_LENGTH {
        block.counts.push(parse_ridge_count(s.take()?));
    }

    Ok(())
}

fn core_deltas<S: Source>(
    s: &mut S,
    variant: Variant,
    block: &mut CoreDeltaBlock,
    payload_length: usize,
    offset: usize,
    path: impl Fn() -> String,
) -> Result<(), Halt> {
    let start = s.offset();

    let cores = LandmarkInfo::parse_cores(s.take()?, variant);
    block.core_type = cores.kind;
    block.num_cores = cores.count;

    for _ in 0..cores.count {
        let position = LandmarkPosition::parse(s.take()?);
        let mut core = Core {
            kind: landmark_kind(variant, cores.kind, position.kind),
            x: position.x,
            y: position.y,
            angle: None,
        };

        if block.core_is_angular(&core, variant) {
            let [angle] = s.take()?;
            core.angle = Some(angle);
        }

        block.cores.push(core);
    }

    let deltas = LandmarkInfo::parse_deltas(s.take()?, variant);
    block.delta_type = deltas.kind;
    block.num_deltas = deltas.count;

    for _ in 0..deltas.count {
        let position = LandmarkPosition::parse(s.take()?);
        let mut delta = Delta {
            kind: landmark_kind(variant, deltas.kind, position.kind),
            x: position.x,
            y: position.y,
            angles: None,
        };

        if block.delta_is_angular(&delta, variant) {
            delta.angles = Some(s.take()?);
        }

        block.deltas.push(delta);
    }

    let consumed = s.offset() - start;

    if consumed != payload_length {
        return Err(malformed(
            offset,
            path(),
            Malformed::CoreDeltaLength {
                declared: payload_length,
                consumed,
            },
        ));
    }

    Ok(())
}

/// ANSI entries share the block's type; ISO entries carry their own.
fn landmark_kind(variant: Variant, block_kind: u8, entry_kind: u8) -> u8 {
    if variant.is_iso_family() {
        entry_kind
    } else {
        block_kind
    }
}

fn card<S: Source>(s: &mut S, record: &mut Record) -> Result<(), Halt> {
    let variant = record.variant;

    record.num_views = 1;
    let mut view = FingerView::default();

    let filled = card_minutiae(s, variant, &mut view);

    view.num_minutiae = view.minutiae.len() as u8;
    view.partial = matches!(filled, Err(Halt::End));
    record.record_length = view.encoded_length(variant);
    record.views.push(view);

    filled
}

fn card_minutiae<S: Source>(s: &mut S, variant: Variant, view: &mut FingerView) -> Result<(), Halt> {
    while !s.at_end()? {
        if view.minutiae.len() == usize::from(u8::MAX) {
            Err(malformed(
                s.offset(),
                "view[0]".to_owned(),
                Malformed::TooManyMinutiae,
            ))?;
        }

        let minutia = match variant {
            Variant::IsoCompactCard => parse_compact_card(s.take()?),
            _ => parse_normal_card(s.take()?),
        };

        view.minutiae.push(minutia);
    }

    Ok(())
}
