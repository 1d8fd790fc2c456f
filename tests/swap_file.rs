//! End-to-end behavior of rewriting real image files on disk.

use std::fs;
use std::path::Path;

use image::{ColorType, ImageBuffer, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use rbswap::file::{SwapError, check_file, swap_file};

fn write_png(path: &Path, img: &RgbaImage) {
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

fn read_rgba(path: &Path) -> RgbaImage {
    image::open(path).unwrap().into_rgba8()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([
            (x * 17 % 256) as u8,
            (y * 29 % 256) as u8,
            ((x + y) * 7 % 256) as u8,
            (255 - x % 256) as u8,
        ])
    })
}

#[test]
fn swaps_uniform_4x4_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("4x4x3.png");
    write_png(&path, &RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 40])));

    let report = swap_file(&path).unwrap();
    assert_eq!((report.width, report.height), (4, 4));
    assert_eq!(report.color, ColorType::Rgba8);
    assert_eq!(report.format, ImageFormat::Png);

    let out = read_rgba(&path);
    assert_eq!(out.dimensions(), (4, 4));
    assert!(out.pixels().all(|p| p.0 == [30, 20, 10, 40]));
}

#[test]
fn swaps_single_pixel_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.png");
    write_png(&path, &RgbaImage::from_pixel(1, 1, Rgba([255, 0, 128, 255])));

    swap_file(&path).unwrap();
    assert_eq!(read_rgba(&path).get_pixel(0, 0).0, [128, 0, 255, 255]);
}

#[test]
fn twice_restores_original_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradient.png");
    // Wide enough that rows cover full SIMD blocks plus a tail.
    let orig = gradient(45, 13);
    write_png(&path, &orig);

    swap_file(&path).unwrap();
    let once = read_rgba(&path);
    assert_ne!(once, orig);
    for (o, s) in orig.pixels().zip(once.pixels()) {
        assert_eq!([s[0], s[1], s[2], s[3]], [o[2], o[1], o[0], o[3]]);
    }

    swap_file(&path).unwrap();
    assert_eq!(read_rgba(&path), orig);
}

#[test]
fn keeps_16_bit_png_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.png");
    let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
        ImageBuffer::from_pixel(3, 3, Rgba([513, 1027, 40000, 65535]));
    img.save_with_format(&path, ImageFormat::Png).unwrap();

    let report = swap_file(&path).unwrap();
    assert_eq!(report.color, ColorType::Rgba16);

    let out = image::open(&path).unwrap();
    assert_eq!(out.color(), ColorType::Rgba16);
    assert!(
        out.into_rgba16()
            .pixels()
            .all(|p| p.0 == [40000, 1027, 513, 65535])
    );
}

#[test]
fn shallow_encoder_keeps_16_bit_original() {
    let dir = tempfile::tempdir().unwrap();
    // 16-bit PNG content under an extension whose encoder only writes 8-bit.
    let path = dir.path().join("deep.bmp");
    let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
        ImageBuffer::from_pixel(2, 2, Rgba([59881, 2056, 1028, 65535]));
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    let before = fs::read(&path).unwrap();

    match swap_file(&path) {
        Err(SwapError::DepthLost {
            format,
            expected,
            written,
            ..
        }) => {
            assert_eq!(format, ImageFormat::Bmp);
            assert_eq!(expected, ColorType::Rgba16);
            assert_ne!(written, ColorType::Rgba16);
        }
        other => panic!("expected depth error, got {other:?}"),
    }
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(file_names(dir.path()), ["deep.bmp"]);
}

#[test]
fn missing_file_is_file_access_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.png");

    let err = swap_file(&path).unwrap_err();
    assert!(matches!(err, SwapError::FileAccess { .. }), "{err:?}");
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn rgb_png_is_rejected_and_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.png");
    RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]))
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    let before = fs::read(&path).unwrap();

    match swap_file(&path) {
        Err(SwapError::Precheck { found }) => assert_eq!(found, ColorType::Rgb8),
        other => panic!("expected precheck error, got {other:?}"),
    }
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn garbage_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.png");
    fs::write(&path, b"definitely not a png").unwrap();

    let err = swap_file(&path).unwrap_err();
    assert!(matches!(err, SwapError::Decode { .. }), "{err:?}");
    assert_eq!(fs::read(&path).unwrap(), b"definitely not a png");
}

#[test]
fn unwritable_extension_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    // PNG content under an extension no enabled encoder handles.
    let path = dir.path().join("photo.jpg");
    write_png(&path, &gradient(4, 4));
    let before = fs::read(&path).unwrap();

    let err = swap_file(&path).unwrap_err();
    assert!(matches!(err, SwapError::UnsupportedFormat { .. }), "{err:?}");
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn unknown_extension_falls_back_to_decoded_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("texture.raw");
    write_png(&path, &RgbaImage::from_pixel(2, 1, Rgba([1, 2, 3, 4])));

    let report = swap_file(&path).unwrap();
    assert_eq!(report.format, ImageFormat::Png);
    let out = image::load_from_memory_with_format(&fs::read(&path).unwrap(), ImageFormat::Png)
        .unwrap()
        .into_rgba8();
    assert!(out.pixels().all(|p| p.0 == [3, 2, 1, 4]));
}

#[test]
fn no_temp_files_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clean.png");
    write_png(&path, &gradient(8, 8));

    swap_file(&path).unwrap();
    assert_eq!(file_names(dir.path()), ["clean.png"]);
}

#[test]
fn check_never_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checked.png");
    write_png(&path, &gradient(5, 3));
    let before = fs::read(&path).unwrap();

    let report = check_file(&path).unwrap();
    assert_eq!((report.width, report.height), (5, 3));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[cfg(unix)]
#[test]
fn keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mode.png");
    write_png(&path, &gradient(2, 2));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    swap_file(&path).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

#[cfg(unix)]
#[test]
fn writes_through_symlink() {
    let dir = tempfile::tempdir().unwrap();
    let assets = dir.path().join("assets");
    fs::create_dir(&assets).unwrap();
    let real = assets.join("real.png");
    let link = dir.path().join("link.png");
    write_png(&real, &RgbaImage::from_pixel(1, 1, Rgba([255, 0, 128, 255])));
    std::os::unix::fs::symlink(&real, &link).unwrap();

    swap_file(&link).unwrap();
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&link).unwrap(), real);
    assert_eq!(read_rgba(&real).get_pixel(0, 0).0, [128, 0, 255, 255]);
    assert_eq!(file_names(&assets), ["real.png"]);
    assert_eq!(file_names(dir.path()), ["assets", "link.png"]);
}
