mod fixtures;

use fixtures::*;
use minutiae::{
    Record, Variant,
    avec::{self, Decoded},
    validate,
    validate::{Violation, ViolationKind},
};

fn decode(data: &[u8], variant: Variant) -> Record {
    avec::decode_slice(data, variant).unwrap().into_inner()
}

fn assert_conforms(record: &Record) {
    let violations = validate(record);
    assert!(violations.is_empty(), "{violations:#?}");
}

fn kinds(violations: &[Violation]) -> Vec<&ViolationKind> {
    violations.iter().map(|v| &v.kind).collect()
}

#[test]
fn conforming_records_have_no_violations() {
    assert_conforms(&decode(&simple_ansi_record(), Variant::Ansi));
    assert_conforms(&decode(&full_ansi_record(), Variant::Ansi));

    let iso = iso_record(&[view(1, 0, &[RIDGE_ENDING, BIFURCATION], &[&RIDGE_COUNTS])]);
    assert_conforms(&decode(&iso, Variant::Iso));

    let card = [10, 20, 0x50, 30, 40, 0x88];
    assert_conforms(&decode(&card, Variant::IsoCompactCard));
}

#[test]
fn view_numbers_run_from_zero_per_position() {
    let ordered = ansi_record(&[
        view(1, 0, &[], &[]),
        view(2, 0, &[], &[]),
        view(1, 1, &[], &[]),
        view(2, 1, &[], &[]),
    ]);
    assert_conforms(&decode(&ordered, Variant::Ansi));

    let gap = ansi_record(&[view(1, 0, &[], &[]), view(1, 2, &[], &[])]);
    let violations = validate(&decode(&gap, Variant::Ansi));
    assert_eq!(
        kinds(&violations),
        [&ViolationKind::ViewNumber {
            position: 1,
            expected: 1,
            found: 2,
        }]
    );
    assert_eq!(violations[0].path, "view[1]");

    let late_start = ansi_record(&[view(3, 1, &[], &[])]);
    let violations = validate(&decode(&late_start, Variant::Ansi));
    assert_eq!(
        kinds(&violations),
        [&ViolationKind::ViewNumber {
            position: 3,
            expected: 0,
            found: 1,
        }]
    );
}

#[test]
fn view_number_mismatch_leaves_expectation() {
    let data = ansi_record(&[
        view(1, 1, &[], &[]),
        view(1, 0, &[], &[]),
        view(1, 1, &[], &[]),
    ]);

    let violations = validate(&decode(&data, Variant::Ansi));

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "view[0]");
}

#[test]
fn ridge_count_index_beyond_minutiae() {
    let ridges: &[u8] = &[0x00, 0x01, 0x00, 8, 0, 1, 3, 4];
    let data = ansi_record(&[view(1, 0, &[RIDGE_ENDING, BIFURCATION], &[ridges])]);

    let violations = validate(&decode(&data, Variant::Ansi));

    assert_eq!(
        kinds(&violations),
        [&ViolationKind::RidgeCountIndex {
            index: 3,
            minutiae: 2,
        }]
    );
    assert_eq!(violations[0].path, "view[0]/extended/data[0]/ridge_count[0]");
}

#[test]
fn every_violation_is_collected() {
    let mut record = decode(&full_ansi_record(), Variant::Ansi);
    record.reserved = 1;
    record.views[0].position = 11;
    record.views[0].impression = 4;
    record.views[0].quality = 101;

    let m = &mut record.views[0].minutiae[0];
    m.kind = 3;
    m.angle = 180;
    m.x = 400;
    m.reserved = 1;

    let violations = validate(&record);

    assert_eq!(violations.len(), 8, "{violations:#?}");
    assert!(violations.iter().any(|v| v.kind == ViolationKind::Reserved(1) && v.path == "record"));
    assert!(violations.iter().any(|v| v.kind == ViolationKind::Angle { angle: 180, max: 179 }));
    assert!(violations.iter().any(|v| matches!(
        v.kind,
        ViolationKind::OutsideImage { x: 400, y: 200, .. }
    )));
    assert!(violations.iter().any(|v| matches!(
        v.kind,
        ViolationKind::NotAllowed {
            field: "Impression type",
            value: 4,
            ..
        }
    )));
}

#[test]
fn card_angles_use_card_range() {
    let mut record = decode(&[10, 20, 0x50], Variant::IsoCompactCard);
    record.views[0].minutiae[0].angle = 64;

    assert_eq!(
        kinds(&validate(&record)),
        [&ViolationKind::Angle { angle: 64, max: 63 }]
    );
}

#[test]
fn lengths_and_counts_match_contents() {
    let mut record = decode(&full_ansi_record(), Variant::Ansi);
    record.record_length += 1;
    record.num_views = 2;
    record.views[0].num_minutiae = 1;
    record.views[0].extended.as_mut().unwrap().block_length = 30;

    let violations = validate(&record);
    let kinds = kinds(&violations);

    assert!(kinds.contains(&&ViolationKind::RecordLength {
        declared: 77,
        computed: 74,
    }));
    assert!(kinds.contains(&&ViolationKind::ViewCount {
        declared: 2,
        present: 1,
    }));
    assert!(kinds.contains(&&ViolationKind::MinutiaeCount {
        declared: 1,
        present: 2,
    }));
    assert!(kinds.contains(&&ViolationKind::BlockLength {
        declared: 30,
        records: 32,
    }));
}

#[test]
fn core_angles_follow_core_type() {
    let mut record = decode(&full_ansi_record(), Variant::Ansi);
    let block = record.views[0].extended.as_mut().unwrap();
    let minutiae::ExtendedPayload::CoreDelta(landmarks) = &mut block.records[1].payload else {
        panic!("expected cores and deltas");
    };
    landmarks.cores[0].angle = None;
    landmarks.deltas[0].x = 401;
    landmarks.num_deltas = 2;

    let violations = validate(&record);

    assert_eq!(violations.len(), 3, "{violations:#?}");
    assert!(violations.iter().any(|v| v.kind
        == ViolationKind::AnglePresence {
            landmark: "core",
            angular: true,
        }
        && v.path == "view[0]/extended/data[1]/core[0]"));
    assert!(violations.iter().any(|v| v.path == "view[0]/extended/data[1]/delta[0]"));
}

#[test]
fn partial_nodes_are_reported() {
    let data = full_ansi_record();
    let decoded = avec::decode_slice(&data[..data.len() - 1], Variant::Ansi).unwrap();
    assert!(matches!(decoded, Decoded::Incomplete(_)));

    let violations = validate(decoded.get());
    let partial: Vec<_> = violations
        .iter()
        .filter(|v| v.kind == ViolationKind::Partial)
        .map(|v| v.path.as_str())
        .collect();

    assert_eq!(
        partial,
        ["view[0]", "view[0]/extended", "view[0]/extended/data[2]"]
    );
}

#[test]
fn header_identity_is_checked() {
    let mut record = decode(&simple_ansi_record(), Variant::Ansi);
    record.format_id = *b"FIR\0";
    record.x_resolution = 0;

    let violations = validate(&record);

    assert!(kinds(&violations).contains(&&ViolationKind::FormatId(*b"FIR\0")));
    assert!(kinds(&violations).contains(&&ViolationKind::Resolution { x: 0, y: 197 }));
}

#[cfg(not(feature = "minex"))]
#[test]
fn zero_product_owner_is_a_violation() {
    let mut record = decode(&simple_ansi_record(), Variant::Ansi);
    record.product_owner = 0;

    assert_eq!(kinds(&validate(&record)), [&ViolationKind::ProductOwner]);
}

#[cfg(feature = "minex")]
#[test]
fn zero_product_owner_is_allowed_for_minex() {
    let mut record = decode(&simple_ansi_record(), Variant::Ansi);
    record.product_owner = 0;

    assert_conforms(&record);
}

#[test]
fn violations_display_their_path() {
    let mut record = decode(&simple_ansi_record(), Variant::Ansi);
    record.views[0].minutiae[0].quality = 120;

    let violations = validate(&record);

    assert_eq!(violations.len(), 1);
    assert!(
        violations[0]
            .to_string()
            .starts_with("view[0]/minutia[0]: Minutia quality 120")
    );
}
