mod fixtures;

use fixtures::*;
use minutiae::{
    Record, Variant, avec, convert,
    convert::{ConvertError, Resolution, convert_angle},
    validate,
};

fn decode(data: &[u8], variant: Variant) -> Record {
    avec::decode_slice(data, variant)
        .unwrap()
        .complete()
        .unwrap()
}

#[test]
fn ansi_angle_converts_through_degrees() {
    assert_eq!(convert_angle(45, Variant::Ansi, Variant::Iso), 64);
    assert_eq!(convert_angle(45, Variant::Ansi, Variant::IsoCompactCard), 16);
    assert_eq!(convert_angle(64, Variant::Iso, Variant::Ansi), 45);
    assert_eq!(convert_angle(16, Variant::IsoCompactCard, Variant::Ansi), 45);

    // 358 degrees rounds up to a full turn in the compact card format.
    assert_eq!(convert_angle(179, Variant::Ansi, Variant::IsoCompactCard), 0);
    assert_eq!(convert_angle(179, Variant::Ansi, Variant::Iso), 255);
}

#[test]
fn ansi_to_iso_keeps_geometry_and_quality() {
    let source = decode(&full_ansi_record(), Variant::Ansi);
    let before = source.clone();

    let iso = convert(&source, Variant::Iso, None).unwrap();

    assert_eq!(source, before);
    assert_eq!(iso.variant, Variant::Iso);
    assert_eq!(iso.views.len(), 1);
    assert!(iso.views[0].extended.is_none());

    let m = &iso.views[0].minutiae[0];
    assert_eq!((m.x, m.y, m.angle, m.quality), (100, 200, 64, 60));

    // Header, one view header, two minutiae, and an empty block length.
    assert_eq!(iso.record_length, 24 + 4 + 12 + 2);
    assert_eq!((iso.product_owner, iso.product_type), (0, 0));
    assert!(validate(&iso).is_empty(), "{:#?}", validate(&iso));

    let encoded = avec::encode_vec(&iso).unwrap();
    assert_eq!(encoded.len(), iso.record_length as usize);
    assert_eq!(decode(&encoded, Variant::Iso), iso);
}

#[test]
fn ansi_to_compact_card_rescales_coordinates() {
    let source = decode(&simple_ansi_record(), Variant::Ansi);

    let card = convert(&source, Variant::IsoCompactCard, None).unwrap();

    let m = &card.views[0].minutiae[0];
    // 100 and 200 pixels at 197 pixels per centimetre, in tenths of a
    // millimetre.
    assert_eq!((m.x, m.y), (51, 102));
    assert_eq!(m.angle, 16);
    assert_eq!(m.quality, 0);
    assert_eq!(card.record_length, 3);
    assert_eq!(avec::encode_vec(&card).unwrap().len(), 3);
}

#[test]
fn ansi_to_normal_card_rescales_coordinates() {
    let source = decode(&simple_ansi_record(), Variant::Ansi);

    let card = convert(&source, Variant::IsoNormalCard, None).unwrap();

    let m = &card.views[0].minutiae[0];
    assert_eq!((m.x, m.y), (508, 1015));
    assert_eq!(m.angle, 64);
    assert_eq!(card.record_length, 5);
}

#[test]
fn iso_to_ansi_resets_quality() {
    let iso = decode(
        &iso_record(&[view(1, 0, &[[0x40, 0x64, 0x00, 0xC8, 64, 60]], &[])]),
        Variant::Iso,
    );

    let ansi = convert(&iso, Variant::Ansi, None).unwrap();

    let m = &ansi.views[0].minutiae[0];
    assert_eq!((m.x, m.y, m.angle, m.quality), (100, 200, 45, 0));
    assert_eq!(ansi.record_length, 26 + 4 + 6 + 2);
}

#[test]
fn card_to_ansi_needs_resolution() {
    let card = decode(&[51, 102, 0x50], Variant::IsoCompactCard);

    assert_eq!(
        convert(&card, Variant::Ansi, None),
        Err(ConvertError::MissingResolution)
    );

    let resolution = Resolution { x: 197, y: 197 };
    let ansi = convert(&card, Variant::Ansi, Some(resolution)).unwrap();

    assert_eq!(&ansi.format_id, b"FMR\0");
    assert_eq!(&ansi.spec_version, b" 20\0");
    assert_eq!((ansi.x_resolution, ansi.y_resolution), (197, 197));
    assert_eq!(ansi.num_views, 1);

    let m = &ansi.views[0].minutiae[0];
    assert_eq!((m.x, m.y, m.angle), (100, 201, 45));
}

#[test]
fn iso_family_pairs_are_unsupported() {
    let iso = decode(&iso_record(&[view(1, 0, &[RIDGE_ENDING], &[])]), Variant::Iso);

    for target in [Variant::Iso, Variant::IsoNormalCard, Variant::IsoCompactCard] {
        assert_eq!(
            convert(&iso, target, None),
            Err(ConvertError::UnsupportedPair {
                from: Variant::Iso,
                to: target,
            })
        );
    }
}

#[test]
fn ansi_to_ansi_copies_without_extended_data() {
    let source = decode(&full_ansi_record(), Variant::Ansi);

    let copy = convert(&source, Variant::Ansi, None).unwrap();

    assert_eq!(copy.product_owner, source.product_owner);
    assert_eq!(copy.views[0].minutiae, source.views[0].minutiae);
    assert!(copy.views[0].extended.is_none());
    assert_eq!(copy.record_length, 26 + 4 + 12 + 2);
}

#[test]
fn card_targets_take_one_view() {
    let source = decode(
        &ansi_record(&[view(1, 0, &[], &[]), view(2, 0, &[], &[])]),
        Variant::Ansi,
    );

    assert_eq!(
        convert(&source, Variant::IsoCompactCard, None),
        Err(ConvertError::ViewCount(2))
    );
}

#[test]
fn coordinates_beyond_compact_range_are_rejected() {
    let far = [0x4F, 0x0F, 0x00, 0x10, 0, 0]; // (3855, 16)
    let source = decode(&ansi_record(&[view(1, 0, &[far], &[])]), Variant::Ansi);

    assert!(matches!(
        convert(&source, Variant::IsoCompactCard, None),
        Err(ConvertError::CoordinateOverflow { .. })
    ));
}
