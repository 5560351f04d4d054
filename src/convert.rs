//! Conversion of records between variants.
//!
//! Only conversions into and out of ANSI are supported. Angles are
//! requantised through whole degrees, which loses precision: a round trip
//! through the compact card format keeps angles only to the nearest 5.625
//! degrees. Card variants store positions in fixed physical units, so
//! conversions to and from them rescale coordinates by the capture
//! resolution.
//!
//! Extended data is not carried into the converted record.

use log::info;
use thiserror::Error;

use crate::{
    record::{FingerView, Minutia, Record, Variant},
    sans::header::{FORMAT_ID, SPEC_VERSION},
};

/// Largest coordinate the record formats and the normal card format hold.
const MAX_COORDINATE: u32 = 0x3FFF;
/// Largest coordinate the compact card format holds.
const MAX_COMPACT_COORDINATE: u32 = 0xFF;

/// Capture resolution in pixels per centimetre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub x: u16,
    pub y: u16,
}

/// Errors occurring while converting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// No conversion exists between the two variants.
    #[error("Cannot convert {from} records to {to}.")]
    UnsupportedPair { from: Variant, to: Variant },
    /// A card conversion needs a resolution, and none was available.
    #[error("Conversion needs a non-zero capture resolution.")]
    MissingResolution,
    /// Card records hold exactly one view.
    #[error("Card records hold exactly one view, source has {0}.")]
    ViewCount(usize),
    /// A rescaled coordinate does not fit the target's field.
    #[error("Coordinate ({x}, {y}) does not fit the target format.")]
    CoordinateOverflow { x: u32, y: u32 },
}

/// Convert a record to another variant, building a new record.
///
/// `resolution` supplies the capture resolution for conversions involving
/// card variants. When absent, the source header's resolution is used;
/// card sources have none, so it must be given.
pub fn convert(
    source: &Record,
    target: Variant,
    resolution: Option<Resolution>,
) -> Result<Record, ConvertError> {
    let from = source.variant;

    if from.is_iso_family() && target.is_iso_family() {
        Err(ConvertError::UnsupportedPair { from, to: target })?;
    }

    if target.is_card() && source.views.len() != 1 {
        Err(ConvertError::ViewCount(source.views.len()))?;
    }

    let resolution = resolution
        .or_else(|| {
            from.has_header().then_some(Resolution {
                x: source.x_resolution,
                y: source.y_resolution,
            })
        })
        .filter(|r| r.x != 0 && r.y != 0);

    let resolution = match resolution {
        Some(r) => Some(r),
        None if from.is_card() || target.is_card() => Err(ConvertError::MissingResolution)?,
        None => None,
    };

    let mut record = Record::new(target);

    if from.has_header() {
        record.format_id = source.format_id;
        record.spec_version = source.spec_version;
        record.compliance = source.compliance;
        record.scanner_id = source.scanner_id;
        record.x_image_size = source.x_image_size;
        record.y_image_size = source.y_image_size;
        record.x_resolution = source.x_resolution;
        record.y_resolution = source.y_resolution;
        record.reserved = source.reserved;

        if from == Variant::Ansi && target == Variant::Ansi {
            record.product_owner = source.product_owner;
            record.product_type = source.product_type;
        }
    } else {
        record.format_id = FORMAT_ID;
        record.spec_version = SPEC_VERSION;
    }

    if let Some(r) = resolution.filter(|_| target.has_header()) {
        record.x_resolution = r.x;
        record.y_resolution = r.y;
    }

    let converter = Converter {
        from,
        to: target,
        resolution,
    };

    for view in &source.views {
        if view.extended.is_some() {
            info!("Dropping extended data of a view while converting {from} to {target}.");
        }

        record.views.push(converter.view(view)?);
    }

    record.num_views = record.views.len() as u8;
    record.record_length = record.computed_length();

    Ok(record)
}

struct Converter {
    from: Variant,
    to: Variant,
    resolution: Option<Resolution>,
}

impl Converter {
    fn view(&self, view: &FingerView) -> Result<FingerView, ConvertError> {
        let minutiae = view
            .minutiae
            .iter()
            .map(|m| self.minutia(m))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FingerView {
            position: view.position,
            view_number: view.view_number,
            impression: view.impression,
            quality: view.quality,
            num_minutiae: minutiae.len() as u8,
            minutiae,
            extended: None,
            partial: false,
        })
    }

    fn minutia(&self, m: &Minutia) -> Result<Minutia, ConvertError> {
        let (x, y) = self.position(m.x, m.y)?;

        let quality = if self.to.is_card() || (self.to == Variant::Ansi && self.from != Variant::Ansi)
        {
            0
        } else {
            m.quality
        };

        Ok(Minutia {
            kind: m.kind,
            x,
            y,
            angle: convert_angle(m.angle, self.from, self.to),
            quality,
            reserved: if self.to.is_card() { 0 } else { m.reserved },
        })
    }

    fn position(&self, x: u16, y: u16) -> Result<(u16, u16), ConvertError> {
        let (x, y) = match (self.resolution, self.from.units_per_mm(), self.to.units_per_mm()) {
            (Some(r), None, Some(units)) => (
                pixels_to_units(x, r.x, units),
                pixels_to_units(y, r.y, units),
            ),
            (Some(r), Some(units), None) => (
                units_to_pixels(x, r.x, units),
                units_to_pixels(y, r.y, units),
            ),
            _ => (u32::from(x), u32::from(y)),
        };

        let max = match self.to {
            Variant::IsoCompactCard => MAX_COMPACT_COORDINATE,
            _ => MAX_COORDINATE,
        };

        if x > max || y > max {
            Err(ConvertError::CoordinateOverflow { x, y })?;
        }

        Ok((x as u16, y as u16))
    }
}

/// Requantise an angle from one variant's units to another's, through whole
/// degrees.
pub fn convert_angle(angle: u8, from: Variant, to: Variant) -> u8 {
    if from == to {
        return angle;
    }

    let degrees = (f64::from(angle) * 360.0 / f64::from(from.angle_levels())).round();
    let levels = to.angle_levels();
    let target = (degrees * f64::from(levels) / 360.0).round() as u32 % levels;

    target as u8
}

/// Rescale a pixel coordinate to card subunits, rounding half up.
fn pixels_to_units(px: u16, resolution: u16, units_per_mm: u32) -> u32 {
    let mm = 10.0 * f64::from(px) / f64::from(resolution);

    (mm * f64::from(units_per_mm) + 0.5).floor() as u32
}

/// Rescale card subunits to a pixel coordinate, rounding half up.
fn units_to_pixels(units: u16, resolution: u16, units_per_mm: u32) -> u32 {
    let mm = f64::from(units) / f64::from(units_per_mm);

    (mm * f64::from(resolution) / 10.0 + 0.5).floor() as u32
}
