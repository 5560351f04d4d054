//! Finger view header layout (ANSI and ISO variants only).

use tartan_bitfield::bitfield;
use zerocopy::{FromBytes, IntoBytes};

use super::{FieldOverflow, fits};

/// Length of a finger view header.
pub const VIEW_HEADER_LENGTH: u32 = 4;

bitfield! {
    struct ViewImpression(u8) {
        [0..4] impression: u8,
        [4..8] view_number: u8,
    }
}

/// The fields opening a finger view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewHeader {
    pub position: u8,
    pub view_number: u8,
    pub impression: u8,
    pub quality: u8,
    pub num_minutiae: u8,
}

#[repr(C)]
#[derive(FromBytes, IntoBytes)]
struct ViewHeaderLayout {
    position: u8,
    view_impression: u8,
    quality: u8,
    num_minutiae: u8,
}

impl ViewHeader {
    pub fn parse(r: [u8; 4]) -> Self {
        let ViewHeaderLayout {
            position,
            view_impression,
            quality,
            num_minutiae,
        } = zerocopy::transmute!(r);

        let view_impression = ViewImpression(view_impression);

        Self {
            position,
            view_number: view_impression.view_number(),
            impression: view_impression.impression(),
            quality,
            num_minutiae,
        }
    }

    pub fn emit(&self) -> Result<[u8; 4], FieldOverflow> {
        fits("view_number", self.view_number, 4)?;
        fits("impression", self.impression, 4)?;

        let mut view_impression = ViewImpression(0);
        view_impression.set_view_number(self.view_number);
        view_impression.set_impression(self.impression);

        Ok(zerocopy::transmute!(ViewHeaderLayout {
            position: self.position,
            view_impression: view_impression.0,
            quality: self.quality,
            num_minutiae: self.num_minutiae,
        }))
    }
}
