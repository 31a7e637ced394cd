use super::*;

#[test]
fn locale_names_parse_loosely() {
    assert_eq!("bottomright".parse::<Locale>().unwrap(), Locale::BottomRight);
    assert_eq!("Bottom-Right".parse::<Locale>().unwrap(), Locale::BottomRight);
    assert_eq!("top_left".parse::<Locale>().unwrap(), Locale::TopLeft);
    assert_eq!("".parse::<Locale>().unwrap(), Locale::Default);
    assert_eq!("DEFAULT".parse::<Locale>().unwrap(), Locale::Default);
    for l in Locale::NAMED {
        assert_eq!(l.name().parse::<Locale>().unwrap(), l);
    }
}

#[test]
fn unknown_locale_is_an_error_strictly_and_default_leniently() {
    let err = "diagonal".parse::<Locale>().unwrap_err();
    assert!(matches!(err, PackError::UnsupportedLocale(ref s) if s == "diagonal"));
    assert_eq!(Locale::parse_lenient("diagonal"), Locale::Default);
}

#[test]
fn default_anchor_matches_center() {
    assert_eq!(Locale::Default.anchor(), Locale::Center.anchor());
    let a = Locale::Center.anchor();
    assert_eq!((a.x, a.y, a.align_h, a.align_v), (64, 32, AlignH::Center, AlignV::Bottom));
}

#[test]
fn anchor_table_is_complete() {
    let table = [
        (Locale::BottomCenter, 64, 49, AlignH::Center, AlignV::Top),
        (Locale::TopCenter, 64, 0, AlignH::Center, AlignV::Bottom),
        (Locale::LeftCenter, 0, 32, AlignH::Right, AlignV::Center),
        (Locale::RightCenter, 115, 32, AlignH::Left, AlignV::Center),
        (Locale::BottomRight, 115, 49, AlignH::Left, AlignV::Top),
        (Locale::TopRight, 115, 0, AlignH::Left, AlignV::Bottom),
        (Locale::BottomLeft, 0, 49, AlignH::Right, AlignV::Top),
        (Locale::TopLeft, 0, 0, AlignH::Right, AlignV::Bottom),
    ];
    for (locale, x, y, h, v) in table {
        let a = locale.anchor();
        assert_eq!((a.x, a.y, a.align_h, a.align_v), (x, y, h, v), "{locale}");
    }
}

#[test]
fn line_markers_are_literal_backslash_n() {
    assert_eq!(line_count("one"), 1);
    assert_eq!(line_count("one\\ntwo"), 2);
    assert_eq!(line_count("one\ntwo"), 1);
    assert_eq!(char_count("abc\\nde"), 5);
}

#[test]
fn two_line_text_in_bottom_right_shifts_up_and_left() {
    let a = Locale::BottomRight.anchor().fit_text("abcd\\nefgh");
    assert_eq!(a.y, 37);
    assert_eq!(a.x, 73);
}

#[test]
fn geometry_clamps_at_zero() {
    let a = Locale::TopLeft.anchor().fit_text("a\\nb\\nc");
    assert_eq!((a.x, a.y), (0, 0));

    let long = "x".repeat(40);
    let a = Locale::RightCenter.anchor().fit_text(&long);
    assert_eq!(a.x, 0);
    assert_eq!(a.y, 32);
}

#[test]
fn single_character_does_not_move_the_anchor() {
    let a = Locale::Center.anchor().fit_text("!");
    assert_eq!((a.x, a.y), (64, 32));
}

#[test]
fn zero_span_widens_to_the_whole_pack() {
    let spec = BubbleSpec {
        text: "hi".to_string(),
        ..BubbleSpec::default()
    };
    let span = spec.span(10);
    assert_eq!((span.start, span.end), (FrameIndex(0), FrameIndex(10)));

    let spec = BubbleSpec {
        start_frame: 2,
        end_frame: 4,
        ..spec
    };
    let span = spec.span(10);
    assert_eq!((span.start, span.end), (FrameIndex(2), FrameIndex(4)));
}

#[test]
fn empty_text_produces_no_slot() {
    let spec = BubbleSpec {
        locale: Locale::TopLeft,
        ..BubbleSpec::default()
    };
    assert!(spec.layout(3).is_none());
}

#[test]
fn non_sentinel_span_is_kept_verbatim() {
    let spec = BubbleSpec {
        text: "hi".to_string(),
        start_frame: 3,
        end_frame: 0,
        ..BubbleSpec::default()
    };
    let slot = spec.layout(10).unwrap();
    assert_eq!(slot.span.start, FrameIndex(3));
    assert_eq!(slot.span.end, FrameIndex(0));

    let spec = BubbleSpec {
        start_frame: 5,
        end_frame: 2,
        ..spec
    };
    let span = spec.span(10);
    assert_eq!((span.start, span.end), (FrameIndex(5), FrameIndex(2)));
}

#[test]
fn locale_deserializes_leniently() {
    let spec: BubbleSpec =
        serde_json::from_str(r#"{"locale":"diagonal","text":"hey"}"#).unwrap();
    assert_eq!(spec.locale, Locale::Default);

    let spec: BubbleSpec = serde_json::from_str(r#"{"locale":"top-right"}"#).unwrap();
    assert_eq!(spec.locale, Locale::TopRight);
    assert_eq!(serde_json::to_string(&Locale::TopRight).unwrap(), "\"topright\"");
}
