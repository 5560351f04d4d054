//! Reordering and pruning of a view's minutiae.
//!
//! The policies work on borrowed minutiae and return new sequences of
//! references, leaving the view untouched. Every policy measures against the
//! centroid of its whole input, taken once per call. Pruning keeps the
//! relative order of the minutiae it retains.
//!
//! [`select_view`] and [`select_record`] apply a policy to whole views,
//! building new trees ready for encoding.

use rand::{Rng, seq::SliceRandom};

use crate::record::{FingerView, Minutia, Record};

/// A policy choosing and ordering minutiae.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Order by distance from the centroid, nearest first.
    Polar,
    /// Order uniformly at random.
    Random,
    /// Keep minutiae inside an ellipse about the centroid, with semi-axes
    /// `a` along x and `b` along y.
    Elliptical { a: u16, b: u16 },
    /// Keep minutiae inside a rectangle, edges included.
    Rectangular {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
}

/// Arithmetic mean of the minutiae positions, truncated toward zero.
///
/// Returns `None` for an empty input.
pub fn centroid(minutiae: &[&Minutia]) -> Option<(i64, i64)> {
    let n = i64::try_from(minutiae.len()).ok().filter(|&n| n > 0)?;

    let (x, y) = minutiae.iter().fold((0i64, 0i64), |(x, y), m| {
        (x + i64::from(m.x), y + i64::from(m.y))
    });

    Some((x / n, y / n))
}

/// Sort by distance from the centroid, nearest first. Minutiae at equal
/// distances keep their input order.
pub fn sort_polar<'a>(minutiae: &[&'a Minutia]) -> Vec<&'a Minutia> {
    let mut sorted = minutiae.to_vec();

    if let Some((cx, cy)) = centroid(minutiae) {
        sorted.sort_by_key(|m| {
            let dx = i64::from(m.x) - cx;
            let dy = i64::from(m.y) - cy;
            dx * dx + dy * dy
        });
    }

    sorted
}

/// Shuffle into a uniformly random order drawn from `rng`.
pub fn shuffle<'a, R: Rng + ?Sized>(minutiae: &[&'a Minutia], rng: &mut R) -> Vec<&'a Minutia> {
    let mut shuffled = minutiae.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Keep the minutiae inside an ellipse centred on the centroid.
///
/// A minutia at offset `(dx, dy)` from the centroid is kept when
/// `(dx / a)^2 + (dy / b)^2 <= 1`, tested exactly in integers. A zero
/// semi-axis flattens the ellipse onto a segment of the other axis, and with
/// both zero only minutiae on the centroid are kept.
pub fn prune_elliptical<'a>(minutiae: &[&'a Minutia], a: u16, b: u16) -> Vec<&'a Minutia> {
    let Some((cx, cy)) = centroid(minutiae) else {
        return Vec::new();
    };

    let (a, b) = (i128::from(a), i128::from(b));
    let bound = (a * b) * (a * b);

    minutiae
        .iter()
        .copied()
        .filter(|m| {
            let dx = i128::from(i64::from(m.x) - cx);
            let dy = i128::from(i64::from(m.y) - cy);

            match (a, b) {
                (0, _) => dx == 0 && dy.abs() <= b,
                (_, 0) => dy == 0 && dx.abs() <= a,
                _ => (dx * b) * (dx * b) + (dy * a) * (dy * a) <= bound,
            }
        })
        .collect()
}

/// Keep the minutiae inside a rectangle, edges included.
pub fn prune_rectangular<'a>(
    minutiae: &[&'a Minutia],
    x: u16,
    y: u16,
    width: u16,
    height: u16,
) -> Vec<&'a Minutia> {
    let xs = u32::from(x)..=u32::from(x) + u32::from(width);
    let ys = u32::from(y)..=u32::from(y) + u32::from(height);

    minutiae
        .iter()
        .copied()
        .filter(|m| xs.contains(&u32::from(m.x)) && ys.contains(&u32::from(m.y)))
        .collect()
}

/// Apply a selection policy.
pub fn select<'a, R: Rng + ?Sized>(
    minutiae: &[&'a Minutia],
    selection: Selection,
    rng: &mut R,
) -> Vec<&'a Minutia> {
    match selection {
        Selection::Polar => sort_polar(minutiae),
        Selection::Random => shuffle(minutiae, rng),
        Selection::Elliptical { a, b } => prune_elliptical(minutiae, a, b),
        Selection::Rectangular {
            x,
            y,
            width,
            height,
        } => prune_rectangular(minutiae, x, y, width, height),
    }
}

/// Build a new view holding the selected minutiae, keeping at most `limit`.
///
/// The extended data is dropped, as ridge counts refer to minutiae by their
/// position in the original view.
pub fn select_view<R: Rng + ?Sized>(
    view: &FingerView,
    selection: Selection,
    limit: Option<usize>,
    rng: &mut R,
) -> FingerView {
    let refs = view.minutia_refs();
    let mut selected = select(&refs, selection, rng);

    if let Some(limit) = limit {
        selected.truncate(limit);
    }

    let minutiae: Vec<Minutia> = selected.into_iter().copied().collect();

    FingerView {
        position: view.position,
        view_number: view.view_number,
        impression: view.impression,
        quality: view.quality,
        num_minutiae: u8::try_from(minutiae.len()).unwrap_or(u8::MAX),
        minutiae,
        extended: None,
        partial: view.partial,
    }
}

/// Build a new record with a selection applied to every view, updating the
/// record length to match.
pub fn select_record<R: Rng + ?Sized>(
    record: &Record,
    selection: Selection,
    limit: Option<usize>,
    rng: &mut R,
) -> Record {
    let mut selected = Record {
        views: record
            .views
            .iter()
            .map(|v| select_view(v, selection, limit, rng))
            .collect(),
        ..record.clone()
    };

    selected.record_length = selected.computed_length();
    selected
}
