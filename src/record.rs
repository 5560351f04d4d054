//! The in-memory record tree shared by every component.
//!
//! A [`Record`] owns its [`FingerView`]s, which own their [`Minutia`]s and
//! optional [`ExtendedDataBlock`]. Nodes never point back at their parents;
//! when a check needs the ancestor chain (a minutia's coordinates against the
//! record's image size, for instance), it navigates through [`ViewRef`] and
//! [`MinutiaRef`], which borrow the tree and hold only indices.

use core::{fmt, str::FromStr};

use thiserror::Error;

use crate::sans::{
    extended::BLOCK_LENGTH_FIELD,
    header::{ANSI_HEADER_LENGTH, ANSI_LARGE_HEADER_LENGTH, ISO_HEADER_LENGTH},
    minutia::{COMPACT_CARD_MINUTIA_LENGTH, NORMAL_CARD_MINUTIA_LENGTH, RECORD_MINUTIA_LENGTH},
    view::VIEW_HEADER_LENGTH,
};

mod extended;

pub use extended::{
    Core, CoreDeltaBlock, Delta, ExtendedData, ExtendedDataBlock, ExtendedPayload, RidgeCount,
    RidgeCountBlock,
};

/// One of the four encodings of a finger minutiae record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// ANSI INCITS 378.
    Ansi,
    /// ISO/IEC 19794-2 record format.
    Iso,
    /// ISO/IEC 19794-2 normal card format, without a record header.
    IsoNormalCard,
    /// ISO/IEC 19794-2 compact card format, without a record header.
    IsoCompactCard,
}

impl Variant {
    /// Whether records of this variant open with a record header.
    pub fn has_header(self) -> bool {
        matches!(self, Self::Ansi | Self::Iso)
    }

    /// Whether this is one of the header-less card variants.
    pub fn is_card(self) -> bool {
        !self.has_header()
    }

    /// Whether this variant belongs to the ISO family.
    pub fn is_iso_family(self) -> bool {
        self != Self::Ansi
    }

    /// Encoded size of one minutia, in bytes.
    pub fn minutia_length(self) -> u32 {
        match self {
            Self::Ansi | Self::Iso => RECORD_MINUTIA_LENGTH,
            Self::IsoNormalCard => NORMAL_CARD_MINUTIA_LENGTH,
            Self::IsoCompactCard => COMPACT_CARD_MINUTIA_LENGTH,
        }
    }

    /// Number of angle steps making up a full turn.
    ///
    /// ANSI stores angles in units of two degrees, the record and normal
    /// card formats in 256ths of a turn, and the compact card format in
    /// 64ths.
    pub fn angle_levels(self) -> u32 {
        match self {
            Self::Ansi => 180,
            Self::Iso | Self::IsoNormalCard => 256,
            Self::IsoCompactCard => 64,
        }
    }

    /// Largest angle value this variant can hold.
    pub fn max_angle(self) -> u8 {
        match self {
            Self::Ansi => 179,
            Self::Iso | Self::IsoNormalCard => 255,
            Self::IsoCompactCard => 63,
        }
    }

    /// Coordinate subunits per millimetre for card variants, which store
    /// positions in fixed physical units rather than pixels.
    pub fn units_per_mm(self) -> Option<u32> {
        match self {
            Self::Ansi | Self::Iso => None,
            Self::IsoNormalCard => Some(100),
            Self::IsoCompactCard => Some(10),
        }
    }

    /// Smallest record header length for this variant.
    pub fn min_record_length(self) -> u32 {
        match self {
            Self::Ansi => ANSI_HEADER_LENGTH,
            Self::Iso => ISO_HEADER_LENGTH,
            Self::IsoNormalCard | Self::IsoCompactCard => 0,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ansi => "ANSI",
            Self::Iso => "ISO",
            Self::IsoNormalCard => "ISONC",
            Self::IsoCompactCard => "ISOCC",
        })
    }
}

/// An unrecognised variant name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown record variant `{0}`; expected one of ANSI, ISO, ISONC, ISOCC.")]
pub struct UnknownVariant(pub String);

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANSI" => Ok(Self::Ansi),
            "ISO" => Ok(Self::Iso),
            "ISONC" => Ok(Self::IsoNormalCard),
            "ISOCC" => Ok(Self::IsoCompactCard),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// A finger minutiae record.
///
/// Declared counts and lengths are kept as read, independent of the
/// collections they describe, so that conformance checking can compare the
/// two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub variant: Variant,
    pub format_id: [u8; 4],
    pub spec_version: [u8; 4],
    pub record_length: u32,
    /// CBEFF product identifier owner (ANSI only).
    pub product_owner: u16,
    /// CBEFF product identifier type (ANSI only).
    pub product_type: u16,
    /// Capture equipment compliance flags, four bits.
    pub compliance: u8,
    /// Capture equipment identifier, twelve bits.
    pub scanner_id: u16,
    pub x_image_size: u16,
    pub y_image_size: u16,
    /// Horizontal resolution in pixels per centimetre.
    pub x_resolution: u16,
    /// Vertical resolution in pixels per centimetre.
    pub y_resolution: u16,
    pub num_views: u8,
    pub reserved: u8,
    pub views: Vec<FingerView>,
}

impl Record {
    /// An empty record of a variant, with every header field zeroed.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            format_id: [0; 4],
            spec_version: [0; 4],
            record_length: 0,
            product_owner: 0,
            product_type: 0,
            compliance: 0,
            scanner_id: 0,
            x_image_size: 0,
            y_image_size: 0,
            x_resolution: 0,
            y_resolution: 0,
            num_views: 0,
            reserved: 0,
            views: Vec::new(),
        }
    }

    /// Navigate to a view, keeping the way back to this record.
    pub fn view_ref(&self, index: usize) -> Option<ViewRef<'_>> {
        (index < self.views.len()).then_some(ViewRef {
            record: self,
            index,
        })
    }

    /// Navigate to every view in file order.
    pub fn view_refs(&self) -> impl Iterator<Item = ViewRef<'_>> {
        (0..self.views.len()).map(move |index| ViewRef {
            record: self,
            index,
        })
    }

    /// Length of this record as it would be encoded, from its contents
    /// rather than its declared length.
    ///
    /// ANSI records switch to the larger header once the total no longer
    /// fits the two-byte length field.
    pub fn computed_length(&self) -> u32 {
        let body: u32 = self
            .views
            .iter()
            .map(|v| v.encoded_length(self.variant))
            .sum();

        match self.variant {
            Variant::Ansi if ANSI_HEADER_LENGTH + body <= u32::from(u16::MAX) => {
                ANSI_HEADER_LENGTH + body
            }
            Variant::Ansi => ANSI_LARGE_HEADER_LENGTH + body,
            Variant::Iso => ISO_HEADER_LENGTH + body,
            Variant::IsoNormalCard | Variant::IsoCompactCard => body,
        }
    }
}

/// A finger view minutiae record: one impression of one finger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerView {
    /// Finger or palm position code.
    pub position: u8,
    pub view_number: u8,
    pub impression: u8,
    pub quality: u8,
    pub num_minutiae: u8,
    pub minutiae: Vec<Minutia>,
    pub extended: Option<ExtendedDataBlock>,
    /// Set when the stream ended before this view was fully read.
    pub partial: bool,
}

impl FingerView {
    /// Bytes this view occupies when encoded as `variant`, including its
    /// extended data block.
    pub fn encoded_length(&self, variant: Variant) -> u32 {
        let minutiae = self.minutiae.len() as u32 * variant.minutia_length();

        if variant.is_card() {
            return minutiae;
        }

        let extended = self
            .extended
            .as_ref()
            .map_or(0, |b| u32::from(b.block_length));

        VIEW_HEADER_LENGTH + minutiae + BLOCK_LENGTH_FIELD + extended
    }

    /// Borrow every minutia, in file order.
    pub fn minutia_refs(&self) -> Vec<&Minutia> {
        self.minutiae.iter().collect()
    }

    /// Every ridge count entry across the extended data records.
    pub fn ridge_counts(&self) -> impl Iterator<Item = &RidgeCount> {
        self.extended_payloads().flat_map(|p| match p {
            ExtendedPayload::RidgeCount(b) => b.counts.as_slice(),
            _ => &[][..],
        })
    }

    /// Every core entry across the extended data records.
    pub fn cores(&self) -> impl Iterator<Item = &Core> {
        self.extended_payloads().flat_map(|p| match p {
            ExtendedPayload::CoreDelta(b) => b.cores.as_slice(),
            _ => &[][..],
        })
    }

    /// Every delta entry across the extended data records.
    pub fn deltas(&self) -> impl Iterator<Item = &Delta> {
        self.extended_payloads().flat_map(|p| match p {
            ExtendedPayload::CoreDelta(b) => b.deltas.as_slice(),
            _ => &[][..],
        })
    }

    fn extended_payloads(&self) -> impl Iterator<Item = &ExtendedPayload> {
        self.extended
            .iter()
            .flat_map(|b| b.records.iter().map(|r| &r.payload))
    }
}

/// A single minutia point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Minutia {
    /// Type code; see [`MinutiaType`].
    pub kind: u8,
    pub x: u16,
    pub y: u16,
    /// Direction in the variant's angle units.
    pub angle: u8,
    pub quality: u8,
    /// The two bits stored above the y coordinate, which must be zero.
    pub reserved: u8,
}

impl Minutia {
    /// Interpret the type code, if it is a defined one.
    pub fn minutia_type(&self) -> Option<MinutiaType> {
        MinutiaType::try_from(self.kind).ok()
    }
}

/// Defined minutia type codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinutiaType {
    Other = 0,
    RidgeEnding = 1,
    Bifurcation = 2,
}

impl TryFrom<u8> for MinutiaType {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            0 => Ok(Self::Other),
            1 => Ok(Self::RidgeEnding),
            2 => Ok(Self::Bifurcation),
            _ => Err(code),
        }
    }
}

/// A view reached from its record.
#[derive(Debug, Clone, Copy)]
pub struct ViewRef<'a> {
    record: &'a Record,
    index: usize,
}

impl<'a> ViewRef<'a> {
    /// The record owning this view.
    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// Position of this view within its record.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn view(&self) -> &'a FingerView {
        &self.record.views[self.index]
    }

    /// Navigate to every minutia of this view in file order.
    pub fn minutia_refs(self) -> impl Iterator<Item = MinutiaRef<'a>> {
        (0..self.view().minutiae.len()).map(move |index| MinutiaRef { view: self, index })
    }
}

/// A minutia reached from its view.
#[derive(Debug, Clone, Copy)]
pub struct MinutiaRef<'a> {
    view: ViewRef<'a>,
    index: usize,
}

impl<'a> MinutiaRef<'a> {
    /// The view owning this minutia.
    pub fn view(&self) -> ViewRef<'a> {
        self.view
    }

    /// Position of this minutia within its view.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn minutia(&self) -> &'a Minutia {
        &self.view.view().minutiae[self.index]
    }
}
