use super::*;
use crate::encode::packed::encode;
use crate::meta::descriptor::{PackConfig, build};
use crate::raster::frame::RasterFrame;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_sink").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn small_cfg(frame_count: u64) -> SinkConfig {
    SinkConfig {
        canvas: Canvas::new(8, 2).unwrap(),
        frame_count,
    }
}

fn small_frame() -> PackedFrame {
    encode(&RasterFrame::blank(8, 2).unwrap())
}

fn small_descriptor(frame_count: u64) -> Descriptor {
    let cfg = PackConfig {
        canvas: Canvas::new(8, 2).unwrap(),
        ..PackConfig::default()
    };
    build(frame_count, &cfg).unwrap()
}

#[test]
fn frame_names_are_zero_based() {
    assert_eq!(frame_file_name(FrameIndex(0)), "frame_0.bm");
    assert_eq!(frame_file_name(FrameIndex(12)), "frame_12.bm");
}

#[test]
fn dir_sink_writes_frames_and_descriptor() {
    let dir = scratch_dir("writes");
    let mut sink = DirSink::new(DirSinkOpts::new(&dir));
    sink.begin(small_cfg(2)).unwrap();
    sink.push_frame(FrameIndex(0), &small_frame()).unwrap();
    sink.push_frame(FrameIndex(1), &small_frame()).unwrap();
    sink.end(&small_descriptor(2)).unwrap();

    assert_eq!(std::fs::read(dir.join("frame_0.bm")).unwrap(), vec![0u8, 0, 0]);
    assert!(dir.join("frame_1.bm").exists());
    let meta = std::fs::read_to_string(dir.join(DESCRIPTOR_FILE_NAME)).unwrap();
    assert!(meta.contains("Passive frames: 2\n"));
    assert_eq!(sink.written(), 2);
}

#[test]
fn dir_sink_rejects_gaps_and_reordering() {
    let dir = scratch_dir("order");
    let mut sink = DirSink::new(DirSinkOpts::new(&dir));
    sink.begin(small_cfg(3)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &small_frame()).is_err());
    sink.push_frame(FrameIndex(0), &small_frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &small_frame()).is_err());
    assert!(!dir.join("frame_1.bm").exists());
    assert_eq!(sink.written(), 1);
}

#[test]
fn dir_sink_checks_descriptor_count_and_frame_size() {
    let dir = scratch_dir("mismatch");
    let mut sink = DirSink::new(DirSinkOpts::new(&dir));
    sink.begin(small_cfg(1)).unwrap();

    let wrong = encode(&RasterFrame::blank(16, 2).unwrap());
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &wrong),
        Err(PackError::InvalidFrameFormat(_))
    ));

    sink.push_frame(FrameIndex(0), &small_frame()).unwrap();
    assert!(sink.end(&small_descriptor(2)).is_err());
    assert!(!dir.join(DESCRIPTOR_FILE_NAME).exists());
}

#[test]
fn dir_sink_without_overwrite_keeps_existing_files() {
    let dir = scratch_dir("no_overwrite");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("frame_0.bm"), b"keep").unwrap();

    let mut sink = DirSink::new(DirSinkOpts {
        out_dir: dir.clone(),
        overwrite: false,
    });
    sink.begin(small_cfg(1)).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &small_frame()).is_err());
    assert_eq!(std::fs::read(dir.join("frame_0.bm")).unwrap(), b"keep");
}

#[test]
fn in_memory_sink_captures_everything() {
    let mut sink = InMemorySink::new();
    sink.begin(small_cfg(1)).unwrap();
    sink.push_frame(FrameIndex(0), &small_frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(5), &small_frame()).is_err());
    sink.end(&small_descriptor(1)).unwrap();

    assert_eq!(sink.frames().len(), 1);
    assert_eq!(sink.config().unwrap().frame_count, 1);
    assert_eq!(sink.descriptor().unwrap().passive_frames(), 1);
}

#[test]
fn dir_sink_refuses_descriptor_for_a_short_pack() {
    let dir = scratch_dir("short");
    let mut sink = DirSink::new(DirSinkOpts::new(&dir));
    sink.begin(small_cfg(2)).unwrap();
    sink.push_frame(FrameIndex(0), &small_frame()).unwrap();

    let err = sink.end(&small_descriptor(1)).unwrap_err();
    assert!(err.to_string().contains("announced 2 frames"));
    assert!(dir.join("frame_0.bm").exists());
    assert!(!dir.join(DESCRIPTOR_FILE_NAME).exists());
}
