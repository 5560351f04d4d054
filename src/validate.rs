//! Conformance checking of decoded records.
//!
//! [`validate`] walks the whole tree and collects every violation found,
//! rather than stopping at the first. Each [`Violation`] names the node it
//! was found on by a path such as `view[1]/minutia[4]`.
//!
//! Fields restricted to a set of codes are checked against the named sets in
//! this module through [`AllowedSet`].

use core::{fmt, ops::RangeInclusive};

use log::debug;
use thiserror::Error;

use crate::{
    record::{
        CoreDeltaBlock, ExtendedDataBlock, ExtendedPayload, MinutiaRef, Record, RidgeCountBlock,
        Variant, ViewRef,
    },
    sans::header::{FORMAT_ID, SPEC_VERSION},
};

/// Finger and palm position codes.
pub const FINGER_POSITIONS: RangeInclusive<u8> = 0..=10;
/// Impression type codes: live-scan plain and rolled, non-live-scan plain and
/// rolled, swipe, and live-scan contactless.
pub const IMPRESSION_TYPES: &[u8] = &[0, 1, 2, 3, 8, 9];
/// Finger and minutia quality values; zero means unknown.
pub const QUALITY: RangeInclusive<u8> = 0..=100;
/// Minutia type codes.
pub const MINUTIA_TYPES: &[u8] = &[0, 1, 2];
/// Ridge count extraction method codes.
pub const RIDGE_COUNT_METHODS: &[u8] = &[0, 1, 2];
/// Core and delta type codes: non-angular and angular.
pub const CORE_DELTA_TYPES: &[u8] = &[0, 1];

/// A set of values a field may take.
pub trait AllowedSet: fmt::Debug {
    fn allows(&self, value: u8) -> bool;
}

impl AllowedSet for &[u8] {
    fn allows(&self, value: u8) -> bool {
        self.contains(&value)
    }
}

impl AllowedSet for RangeInclusive<u8> {
    fn allows(&self, value: u8) -> bool {
        self.contains(&value)
    }
}

/// A conformance failure, and where in the record it was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct Violation {
    /// Node path, `record` for the header.
    pub path: String,
    pub kind: ViolationKind,
}

/// The ways a record can fail to conform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    #[error("Format identifier {0:?} is not \"FMR\\0\".")]
    FormatId([u8; 4]),
    #[error("Specification version {0:?} is not \" 20\\0\".")]
    SpecVersion([u8; 4]),
    #[error("Record length {length} is shorter than the {minimum}-byte header.")]
    RecordTooShort { length: u32, minimum: u32 },
    #[error("Record length {declared} does not match the {computed} bytes of its contents.")]
    RecordLength { declared: u32, computed: u32 },
    #[error("CBEFF product identifier owner is zero.")]
    ProductOwner,
    #[error("Image resolution {x}x{y} has a zero dimension.")]
    Resolution { x: u16, y: u16 },
    #[error("Reserved field holds {0}; must be zero.")]
    Reserved(u8),
    #[error("Declares {declared} views but holds {present}.")]
    ViewCount { declared: u8, present: usize },
    #[error("Declares {declared} minutiae but holds {present}.")]
    MinutiaeCount { declared: u8, present: usize },
    #[error("Only partly read before the end of the stream.")]
    Partial,
    #[error("{field} {value} is not one of {allowed}.")]
    NotAllowed {
        field: &'static str,
        value: u8,
        allowed: String,
    },
    #[error("View number {found} for finger position {position} is out of sequence; expected {expected}.")]
    ViewNumber { position: u8, expected: u8, found: u8 },
    #[error("Angle {angle} exceeds the maximum of {max}.")]
    Angle { angle: u8, max: u8 },
    #[error("Position ({x}, {y}) lies outside the {width}x{height} image.")]
    OutsideImage {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
    #[error("Block length {declared} does not match the {records} bytes of its records.")]
    BlockLength { declared: u16, records: u32 },
    #[error("Ridge count refers to minutia {index} of a view declaring {minutiae}.")]
    RidgeCountIndex { index: u8, minutiae: u8 },
    #[error("Declares {declared} {landmark}s but holds {present}.")]
    LandmarkCount {
        landmark: &'static str,
        declared: u8,
        present: usize,
    },
    #[error("Angle presence does not match the {landmark} type; expected angles: {angular}.")]
    AnglePresence {
        landmark: &'static str,
        angular: bool,
    },
}

/// Check a record for conformance, returning every violation found.
///
/// An empty result means the record conforms.
pub fn validate(record: &Record) -> Vec<Violation> {
    let mut validator = Validator {
        record,
        next_view: [0; 256],
        violations: Vec::new(),
    };

    validator.record();

    for v in &validator.violations {
        debug!("Violation in {} record: {v}", record.variant);
    }

    validator.violations
}

struct Validator<'a> {
    record: &'a Record,
    /// Next expected view number for each finger position.
    next_view: [u8; 256],
    violations: Vec<Violation>,
}

impl<'a> Validator<'a> {
    fn report(&mut self, path: impl Into<String>, kind: ViolationKind) {
        self.violations.push(Violation {
            path: path.into(),
            kind,
        });
    }

    fn allowed(&mut self, path: &str, field: &'static str, value: u8, set: impl AllowedSet) {
        if !set.allows(value) {
            self.report(
                path,
                ViolationKind::NotAllowed {
                    field,
                    value,
                    allowed: format!("{set:?}"),
                },
            );
        }
    }

    fn angle(&mut self, path: &str, angle: u8) {
        let max = self.record.variant.max_angle();

        if angle > max {
            self.report(path, ViolationKind::Angle { angle, max });
        }
    }

    fn position(&mut self, path: &str, x: u16, y: u16) {
        let Record {
            x_image_size: width,
            y_image_size: height,
            ..
        } = *self.record;

        if x >= width || y >= height {
            self.report(
                path,
                ViolationKind::OutsideImage {
                    x,
                    y,
                    width,
                    height,
                },
            );
        }
    }

    fn record(&mut self) {
        let record = self.record;

        if record.variant.has_header() {
            self.header();
        }

        let computed = record.computed_length();
        if record.record_length != computed {
            self.report(
                "record",
                ViolationKind::RecordLength {
                    declared: record.record_length,
                    computed,
                },
            );
        }

        if usize::from(record.num_views) != record.views.len() {
            self.report(
                "record",
                ViolationKind::ViewCount {
                    declared: record.num_views,
                    present: record.views.len(),
                },
            );
        }

        for view in record.view_refs() {
            self.view(view);
        }
    }

    fn header(&mut self) {
        let record = self.record;
        let path = "record";

        if record.format_id != FORMAT_ID {
            self.report(path, ViolationKind::FormatId(record.format_id));
        }
        if record.spec_version != SPEC_VERSION {
            self.report(path, ViolationKind::SpecVersion(record.spec_version));
        }

        let minimum = record.variant.min_record_length();
        if record.record_length < minimum {
            self.report(
                path,
                ViolationKind::RecordTooShort {
                    length: record.record_length,
                    minimum,
                },
            );
        }

        if record.variant == Variant::Ansi && !cfg!(feature = "minex") && record.product_owner == 0
        {
            self.report(path, ViolationKind::ProductOwner);
        }

        if record.x_resolution == 0 || record.y_resolution == 0 {
            self.report(
                path,
                ViolationKind::Resolution {
                    x: record.x_resolution,
                    y: record.y_resolution,
                },
            );
        }

        if record.reserved != 0 {
            self.report(path, ViolationKind::Reserved(record.reserved));
        }
    }

    fn view(&mut self, view_ref: ViewRef<'a>) {
        let view = view_ref.view();
        let path = format!("view[{}]", view_ref.index());

        if view.partial {
            self.report(&path, ViolationKind::Partial);
        }

        if usize::from(view.num_minutiae) != view.minutiae.len() {
            self.report(
                &path,
                ViolationKind::MinutiaeCount {
                    declared: view.num_minutiae,
                    present: view.minutiae.len(),
                },
            );
        }

        if self.record.variant.has_header() {
            self.allowed(&path, "Finger position", view.position, FINGER_POSITIONS);
            self.view_number(&path, view.position, view.view_number);
            self.allowed(&path, "Impression type", view.impression, IMPRESSION_TYPES);
            self.allowed(&path, "Finger quality", view.quality, QUALITY);
        }

        for minutia in view_ref.minutia_refs() {
            self.minutia(&path, minutia);
        }

        if let Some(block) = &view.extended {
            self.extended(&path, view.num_minutiae, block);
        }
    }

    /// View numbers of each finger position must run 0, 1, 2, ... in file
    /// order. A number out of sequence leaves the expectation unchanged.
    fn view_number(&mut self, path: &str, position: u8, found: u8) {
        let expected = self.next_view[usize::from(position)];

        if found == expected {
            self.next_view[usize::from(position)] = expected.saturating_add(1);
        } else {
            self.report(
                path,
                ViolationKind::ViewNumber {
                    position,
                    expected,
                    found,
                },
            );
        }
    }

    fn minutia(&mut self, view_path: &str, minutia_ref: MinutiaRef<'a>) {
        let m = minutia_ref.minutia();
        let path = format!("{view_path}/minutia[{}]", minutia_ref.index());

        self.allowed(&path, "Minutia type", m.kind, MINUTIA_TYPES);

        if m.reserved != 0 {
            self.report(&path, ViolationKind::Reserved(m.reserved));
        }

        self.angle(&path, m.angle);

        // Card variants carry neither quality nor image dimensions.
        if self.record.variant.has_header() {
            self.allowed(&path, "Minutia quality", m.quality, QUALITY);
            self.position(&path, m.x, m.y);
        }
    }

    fn extended(&mut self, view_path: &str, minutiae: u8, block: &ExtendedDataBlock) {
        let path = format!("{view_path}/extended");

        if block.partial {
            self.report(&path, ViolationKind::Partial);
        }

        let records = block.records_length();
        if u32::from(block.block_length) != records {
            self.report(
                &path,
                ViolationKind::BlockLength {
                    declared: block.block_length,
                    records,
                },
            );
        }

        for (i, data) in block.records.iter().enumerate() {
            let path = format!("{path}/data[{i}]");

            if data.partial {
                self.report(&path, ViolationKind::Partial);
            }

            match &data.payload {
                ExtendedPayload::RidgeCount(b) => self.ridge_counts(&path, minutiae, b),
                ExtendedPayload::CoreDelta(b) => self.core_deltas(&path, b),
                ExtendedPayload::Opaque { .. } => {}
            }
        }
    }

    fn ridge_counts(&mut self, path: &str, minutiae: u8, block: &RidgeCountBlock) {
        self.allowed(path, "Ridge count method", block.method, RIDGE_COUNT_METHODS);

        for (i, c) in block.counts.iter().enumerate() {
            for index in [c.index_one, c.index_two] {
                if index > minutiae {
                    self.report(
                        format!("{path}/ridge_count[{i}]"),
                        ViolationKind::RidgeCountIndex { index, minutiae },
                    );
                }
            }
        }
    }

    fn core_deltas(&mut self, path: &str, block: &CoreDeltaBlock) {
        let variant = self.record.variant;

        if usize::from(block.num_cores) != block.cores.len() {
            self.report(
                path,
                ViolationKind::LandmarkCount {
                    landmark: "core",
                    declared: block.num_cores,
                    present: block.cores.len(),
                },
            );
        }
        if usize::from(block.num_deltas) != block.deltas.len() {
            self.report(
                path,
                ViolationKind::LandmarkCount {
                    landmark: "delta",
                    declared: block.num_deltas,
                    present: block.deltas.len(),
                },
            );
        }

        if variant == Variant::Ansi {
            self.allowed(path, "Core type", block.core_type, CORE_DELTA_TYPES);
            self.allowed(path, "Delta type", block.delta_type, CORE_DELTA_TYPES);
        }

        for (i, core) in block.cores.iter().enumerate() {
            let path = format!("{path}/core[{i}]");

            if variant.is_iso_family() {
                self.allowed(&path, "Core type", core.kind, CORE_DELTA_TYPES);
            }
            self.position(&path, core.x, core.y);

            let angular = block.core_is_angular(core, variant);
            if angular != core.angle.is_some() {
                self.report(
                    &path,
                    ViolationKind::AnglePresence {
                        landmark: "core",
                        angular,
                    },
                );
            }
            if let Some(angle) = core.angle {
                self.angle(&path, angle);
            }
        }

        for (i, delta) in block.deltas.iter().enumerate() {
            let path = format!("{path}/delta[{i}]");

            if variant.is_iso_family() {
                self.allowed(&path, "Delta type", delta.kind, CORE_DELTA_TYPES);
            }
            self.position(&path, delta.x, delta.y);

            let angular = block.delta_is_angular(delta, variant);
            if angular != delta.angles.is_some() {
                self.report(
                    &path,
                    ViolationKind::AnglePresence {
                        landmark: "delta",
                        angular,
                    },
                );
            }
            for angle in delta.angles.into_iter().flatten() {
                self.angle(&path, angle);
            }
        }
    }
}
