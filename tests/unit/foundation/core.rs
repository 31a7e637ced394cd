use super::*;

#[test]
fn frame_range_counts_its_frames() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(4), FrameIndex(3)).is_err());
    assert_eq!(
        FrameRange::new(FrameIndex(3), FrameIndex(3))
            .unwrap()
            .len_frames(),
        0
    );
}

#[test]
fn canvas_row_bytes_rounds_up() {
    assert_eq!(Canvas::new(128, 64).unwrap().row_bytes(), 16);
    assert_eq!(Canvas::new(1, 1).unwrap().row_bytes(), 1);
    assert_eq!(Canvas::new(9, 1).unwrap().row_bytes(), 2);
    assert_eq!(Canvas::new(17, 3).unwrap().row_bytes(), 3);
}

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 64).is_err());
    assert!(Canvas::new(128, 0).is_err());
    assert_eq!(Canvas::default(), Canvas::new(128, 64).unwrap());
    assert_eq!(Canvas::default().to_string(), "128x64");
}
