use super::*;

fn strs(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_magick").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn default_args_reduce_to_one_bit() {
    let args = FilterOptions::default().to_args(Path::new("in.gif"), Path::new("out/raster_%d.png"));
    assert_eq!(
        strs(&args),
        vec![
            "in.gif",
            "-coalesce",
            "-resize",
            "128x64!",
            "-colorspace",
            "Gray",
            "-dither",
            "FloydSteinberg",
            "-monochrome",
            "out/raster_%d.png",
        ]
    );
}

#[test]
fn every_toggle_lands_in_a_stable_position() {
    let opts = FilterOptions {
        canvas: Canvas::new(64, 32).unwrap(),
        contrast_stretch: Some(2.5),
        sharpen: Some(1.0),
        dither: false,
        grayscale: true,
        monochrome: true,
        edge_detect: true,
        invert: true,
    };
    let args = strs(&opts.to_args(Path::new("a.gif"), Path::new("o.png")));
    assert_eq!(
        args,
        vec![
            "a.gif",
            "-coalesce",
            "-resize",
            "64x32!",
            "-contrast-stretch",
            "2.5%",
            "-sharpen",
            "0x1",
            "-colorspace",
            "Gray",
            "-edge",
            "1",
            "-normalize",
            "-negate",
            "-dither",
            "None",
            "-monochrome",
            "o.png",
        ]
    );
}

#[test]
fn indexed_frames_sort_numerically() {
    let dir = scratch_dir("numeric");
    for i in [10, 2, 0, 1, 3, 4, 5, 6, 7, 8, 9] {
        std::fs::write(dir.join(format!("raster_{i}.png")), b"").unwrap();
    }
    std::fs::write(dir.join("notes.txt"), b"").unwrap();
    std::fs::write(dir.join("raster_x.png"), b"").unwrap();

    let frames = collect_indexed_frames(&dir, RASTER_PREFIX, RASTER_EXT).unwrap();
    let names = frames
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(names.len(), 11);
    assert_eq!(names[2], "raster_2.png");
    assert_eq!(names[10], "raster_10.png");
}

#[test]
fn gaps_in_indices_are_rejected() {
    let dir = scratch_dir("gaps");
    for i in [0, 1, 3] {
        std::fs::write(dir.join(format!("raster_{i}.png")), b"").unwrap();
    }
    let err = collect_indexed_frames(&dir, RASTER_PREFIX, RASTER_EXT).unwrap_err();
    assert!(matches!(err, PackError::Validation(_)));
}

#[test]
fn missing_program_is_a_pipeline_error() {
    let dir = scratch_dir("missing_program");
    let input = dir.join("in.gif");
    std::fs::write(&input, b"GIF89a").unwrap();

    let pipeline = MagickPipeline {
        program: PathBuf::from("framepack-no-such-engine"),
        options: FilterOptions::default(),
    };
    assert!(!pipeline.is_available());
    let err = pipeline.run(&input, &dir.join("out")).unwrap_err();
    assert!(matches!(err, PackError::Pipeline(_)));
}

#[test]
fn missing_input_is_rejected_before_spawning() {
    let dir = scratch_dir("missing_input");
    let pipeline = MagickPipeline::new(FilterOptions::default());
    let err = pipeline.run(&dir.join("nope.gif"), &dir).unwrap_err();
    assert!(matches!(err, PackError::Validation(_)));
}

#[test]
fn clearing_rasters_keeps_unrelated_files() {
    let dir = scratch_dir("clear");
    for name in ["raster_0.png", "raster_7.png", "notes.txt", "raster_x.png"] {
        std::fs::write(dir.join(name), b"").unwrap();
    }
    assert_eq!(clear_indexed_frames(&dir, RASTER_PREFIX, RASTER_EXT).unwrap(), 2);
    assert!(!dir.join("raster_0.png").exists());
    assert!(dir.join("notes.txt").exists());
    assert!(dir.join("raster_x.png").exists());
}

#[cfg(unix)]
#[test]
fn rerun_returns_only_what_the_engine_produced() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = scratch_dir("rerun");
    let engine = dir.join("fake-magick");
    std::fs::write(
        &engine,
        "#!/bin/sh\nfor last; do :; done\ndir=$(dirname \"$last\")\n: > \"$dir/raster_0.png\"\n: > \"$dir/raster_1.png\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755)).unwrap();

    let input = dir.join("in.gif");
    std::fs::write(&input, b"GIF89a").unwrap();

    let out = dir.join("rasters");
    std::fs::create_dir_all(&out).unwrap();
    for i in 0..5 {
        std::fs::write(out.join(format!("raster_{i}.png")), b"").unwrap();
    }

    let pipeline = MagickPipeline {
        program: engine,
        options: FilterOptions::default(),
    };
    let frames = pipeline.run(&input, &out).unwrap();
    assert_eq!(frames, vec![out.join("raster_0.png"), out.join("raster_1.png")]);
    assert!(!out.join("raster_4.png").exists());
}
