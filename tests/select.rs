mod fixtures;

use fixtures::*;
use minutiae::{
    Minutia, Variant, avec,
    select::{
        Selection, centroid, prune_elliptical, prune_rectangular, select, select_record,
        select_view, shuffle, sort_polar,
    },
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn at(x: u16, y: u16) -> Minutia {
    Minutia {
        kind: 1,
        x,
        y,
        ..Default::default()
    }
}

fn distance(m: &Minutia, (cx, cy): (i64, i64)) -> i64 {
    let dx = i64::from(m.x) - cx;
    let dy = i64::from(m.y) - cy;
    dx * dx + dy * dy
}

fn positions(minutiae: &[&Minutia]) -> Vec<(u16, u16)> {
    minutiae.iter().map(|m| (m.x, m.y)).collect()
}

fn arb_minutiae() -> impl Strategy<Value = Vec<Minutia>> {
    prop::collection::vec((0..1000u16, 0..1000u16), 0..64)
        .prop_map(|points| points.into_iter().map(|(x, y)| at(x, y)).collect())
}

#[test]
fn centroid_truncates() {
    let points = [at(0, 0), at(10, 10), at(11, 12)];
    let refs: Vec<_> = points.iter().collect();

    assert_eq!(centroid(&refs), Some((7, 7)));
    assert_eq!(centroid(&[]), None);
}

#[test]
fn polar_sort_is_stable() {
    let points = [at(20, 10), at(0, 10), at(10, 10), at(10, 0), at(10, 20)];
    let refs: Vec<_> = points.iter().collect();

    let sorted = sort_polar(&refs);

    assert_eq!(
        positions(&sorted),
        [(10, 10), (20, 10), (0, 10), (10, 0), (10, 20)]
    );
}

#[test]
fn rectangle_keeps_edges_and_order() {
    let points = [
        at(30, 30),
        at(9, 15),
        at(10, 10),
        at(31, 20),
        at(20, 25),
        at(15, 31),
    ];
    let refs: Vec<_> = points.iter().collect();

    let kept = prune_rectangular(&refs, 10, 10, 20, 20);

    assert_eq!(positions(&kept), [(30, 30), (10, 10), (20, 25)]);
}

#[test]
fn ellipse_is_centred_on_centroid() {
    let points = [
        at(100, 100),
        at(110, 100),
        at(90, 100),
        at(100, 105),
        at(100, 95),
        at(110, 101),
    ];
    let refs: Vec<_> = points.iter().collect();
    assert_eq!(centroid(&refs), Some((101, 100)));

    let kept = prune_elliptical(&refs, 10, 5);

    // (100, 105) is one pixel off the minor axis, so just outside.
    assert_eq!(positions(&kept), [(100, 100), (110, 100), (110, 101)]);
}

#[test]
fn flat_ellipse_keeps_only_its_axis() {
    let points = [
        at(100, 90),
        at(100, 110),
        at(100, 100),
        at(90, 100),
        at(110, 100),
    ];
    let refs: Vec<_> = points.iter().collect();
    assert_eq!(centroid(&refs), Some((100, 100)));

    assert_eq!(
        positions(&prune_elliptical(&refs, 0, 10)),
        [(100, 90), (100, 110), (100, 100)]
    );
    assert_eq!(positions(&prune_elliptical(&refs, 0, 5)), [(100, 100)]);
    assert_eq!(
        positions(&prune_elliptical(&refs, 10, 0)),
        [(100, 100), (90, 100), (110, 100)]
    );
    assert_eq!(positions(&prune_elliptical(&refs, 0, 0)), [(100, 100)]);
}

#[test]
fn shuffle_is_seeded() {
    let points: Vec<_> = (0..32).map(|i| at(i, i)).collect();
    let refs: Vec<_> = points.iter().collect();

    let first = shuffle(&refs, &mut ChaCha8Rng::seed_from_u64(7));
    let second = shuffle(&refs, &mut ChaCha8Rng::seed_from_u64(7));

    assert_eq!(positions(&first), positions(&second));
    assert_ne!(positions(&first), positions(&refs));

    let mut sorted = positions(&first);
    sorted.sort_unstable();
    assert_eq!(sorted, positions(&refs));
}

#[test]
fn selected_view_is_a_new_view() {
    let record = avec::decode_slice(&full_ansi_record(), Variant::Ansi)
        .unwrap()
        .into_inner();
    let before = record.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let view = select_view(&record.views[0], Selection::Polar, Some(1), &mut rng);

    assert_eq!(record, before);
    assert_eq!(view.num_minutiae, 1);
    assert_eq!(view.minutiae.len(), 1);
    assert!(view.extended.is_none());
    assert_eq!(view.position, record.views[0].position);
}

#[test]
fn selected_record_length_is_recomputed() {
    let record = avec::decode_slice(&full_ansi_record(), Variant::Ansi)
        .unwrap()
        .into_inner();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let selection = Selection::Rectangular {
        x: 0,
        y: 0,
        width: 60,
        height: 60,
    };
    let selected = select_record(&record, selection, None, &mut rng);

    assert_eq!(selected.views[0].minutiae.len(), 1);
    assert_eq!(selected.record_length, 26 + 4 + 6 + 2);
    assert!(minutiae::validate(&selected).is_empty());
    assert_eq!(
        avec::encode_vec(&selected).unwrap().len(),
        selected.record_length as usize
    );
}

proptest! {
    #[test]
    fn polar_distances_never_decrease(points in arb_minutiae()) {
        let refs: Vec<_> = points.iter().collect();
        let sorted = sort_polar(&refs);

        prop_assert_eq!(sorted.len(), refs.len());

        if let Some(c) = centroid(&refs) {
            for pair in sorted.windows(2) {
                prop_assert!(distance(pair[0], c) <= distance(pair[1], c));
            }
        }
    }

    #[test]
    fn rectangle_retains_only_inside_points(points in arb_minutiae()) {
        let refs: Vec<_> = points.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let selection = Selection::Rectangular { x: 10, y: 10, width: 20, height: 20 };
        let kept = select(&refs, selection, &mut rng);

        for m in &kept {
            prop_assert!((10..=30).contains(&m.x) && (10..=30).contains(&m.y));
        }

        let inside = refs
            .iter()
            .filter(|m| (10..=30).contains(&m.x) && (10..=30).contains(&m.y))
            .count();
        prop_assert_eq!(kept.len(), inside);
    }

    #[test]
    fn ellipse_retains_a_subsequence(points in arb_minutiae(), a in 0..500u16, b in 0..500u16) {
        let refs: Vec<_> = points.iter().collect();
        let kept = prune_elliptical(&refs, a, b);

        let mut rest = refs.iter();
        for m in &kept {
            prop_assert!(rest.any(|r| std::ptr::eq(*r, *m)));
        }
    }

    #[test]
    fn ellipse_stays_within_its_semi_axes(points in arb_minutiae(), a in 0..50u16, b in 0..50u16) {
        let refs: Vec<_> = points.iter().collect();
        let kept = prune_elliptical(&refs, a, b);

        if let Some((cx, cy)) = centroid(&refs) {
            for m in &kept {
                prop_assert!((i64::from(m.x) - cx).abs() <= i64::from(a));
                prop_assert!((i64::from(m.y) - cy).abs() <= i64::from(b));
            }
        }
    }
}
