//! Swap R↔B in an image file and write it back to the same path.
//!
//! The file is decoded with every channel intact, checked to be 4-channel,
//! swapped, and re-encoded in the format its extension names (or, when the
//! extension is unknown, the format it was decoded from). Output goes to a
//! temporary file next to the original and is renamed over it, so a failed
//! encode leaves the original untouched.
//!
//! ```no_run
//! use rbswap::file::{SwapError, swap_file};
//!
//! match swap_file("sprite.png") {
//!     Ok(report) => println!("{}x{} now BGRA", report.width, report.height),
//!     Err(SwapError::Precheck { found }) => eprintln!("not RGBA: {found:?}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{
    ColorType, DynamicImage, ImageBuffer, ImageDecoder, ImageError, ImageFormat, ImageReader, Pixel,
};
use log::{debug, info};

use crate::SizeError;

pub type SwapResult<T> = Result<T, SwapError>;

#[derive(thiserror::Error, Debug)]
pub enum SwapError {
    #[error("cannot read {}: {source}", .path.display())]
    FileAccess { path: PathBuf, source: io::Error },
    #[error("cannot decode {}: {source}", .path.display())]
    Decode { path: PathBuf, source: ImageError },
    #[error("expected a 4-channel image, found {found:?} ({} channels)", .found.channel_count())]
    Precheck { found: ColorType },
    #[error("no encoder for {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: ImageError },
    /// The encoder for `format` stored fewer bits per sample than the image
    /// has. The original file is left as it was.
    #[error(
        "{format:?} cannot hold {expected:?} pixels, {} would become {written:?}",
        .path.display()
    )]
    DepthLost {
        path: PathBuf,
        format: ImageFormat,
        expected: ColorType,
        written: ColorType,
    },
    /// A row kernel rejected the pixel buffer. Decoded non-empty images are
    /// always whole RGBA pixels, so this indicates a bug rather than bad input.
    #[error(transparent)]
    Buffer(#[from] SizeError),
}

/// What a successful swap or check saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport {
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
    pub format: ImageFormat,
}

// ---------------------------------------------------------------------------
// In-memory swap
// ---------------------------------------------------------------------------

/// Swap channels 0 and 2 of every pixel, keeping sample depth.
///
/// 8-bit images go through the SIMD row kernels; 16-bit and float images
/// are swapped pixel by pixel. Anything that is not 4-channel is rejected
/// with [`SwapError::Precheck`].
pub fn swap_image(image: DynamicImage) -> SwapResult<DynamicImage> {
    precheck(image.color())?;
    if image.width() == 0 || image.height() == 0 {
        return Ok(image);
    }
    match image {
        DynamicImage::ImageRgba8(mut buf) => {
            crate::rgba_to_bgra_inplace(&mut buf)?;
            Ok(DynamicImage::ImageRgba8(buf))
        }
        DynamicImage::ImageRgba16(mut buf) => {
            swap_rb_pixels(&mut buf);
            Ok(DynamicImage::ImageRgba16(buf))
        }
        DynamicImage::ImageRgba32F(mut buf) => {
            swap_rb_pixels(&mut buf);
            Ok(DynamicImage::ImageRgba32F(buf))
        }
        other => Err(SwapError::Precheck {
            found: other.color(),
        }),
    }
}

fn precheck(color: ColorType) -> SwapResult<()> {
    if color.channel_count() == 4 {
        Ok(())
    } else {
        Err(SwapError::Precheck { found: color })
    }
}

fn swap_rb_pixels<P: Pixel>(buf: &mut ImageBuffer<P, Vec<P::Subpixel>>) {
    for px in buf.pixels_mut() {
        px.channels_mut().swap(0, 2);
    }
}

// ---------------------------------------------------------------------------
// File operations
// ---------------------------------------------------------------------------

/// Swap R↔B in the image at `path` and overwrite it in place.
///
/// Nothing is written unless the file decodes, is 4-channel, and has an
/// encodable format. The original is replaced only after the new content
/// has been fully written and synced.
pub fn swap_file(path: impl AsRef<Path>) -> SwapResult<SwapReport> {
    let path = path.as_ref();
    let (image, sniffed) = load(path)?;
    let swapped = swap_image(image)?;
    let format = output_format(path, sniffed)?;
    let report = SwapReport::new(&swapped, format);

    write_replacing(path, &swapped, format)?;

    info!(
        "swapped R<->B in {} ({}x{} {:?}, {:?})",
        path.display(),
        report.width,
        report.height,
        report.color,
        report.format
    );
    Ok(report)
}

/// Run every check [`swap_file`] would, without writing anything.
pub fn check_file(path: impl AsRef<Path>) -> SwapResult<SwapReport> {
    let path = path.as_ref();
    let (image, sniffed) = load(path)?;
    precheck(image.color())?;
    let format = output_format(path, sniffed)?;
    Ok(SwapReport::new(&image, format))
}

impl SwapReport {
    fn new(image: &DynamicImage, format: ImageFormat) -> Self {
        SwapReport {
            width: image.width(),
            height: image.height(),
            color: image.color(),
            format,
        }
    }
}

fn load(path: &Path) -> SwapResult<(DynamicImage, Option<ImageFormat>)> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| SwapError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
    let sniffed = reader.format();
    debug!("decoding {} as {:?}", path.display(), sniffed);

    let image = reader.decode().map_err(|source| SwapError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "decoded {}x{} {:?}",
        image.width(),
        image.height(),
        image.color()
    );
    Ok((image, sniffed))
}

/// The extension decides; the decoded format is the fallback.
fn output_format(path: &Path, sniffed: Option<ImageFormat>) -> SwapResult<ImageFormat> {
    ImageFormat::from_path(path)
        .ok()
        .or(sniffed)
        .filter(|f| f.writing_enabled())
        .ok_or_else(|| SwapError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
}

/// Encode into a temp file beside the real target, confirm the encoder kept
/// the sample depth, then rename over the target.
///
/// Symlinks are followed so the link keeps pointing at the rewritten file.
fn write_replacing(path: &Path, image: &DynamicImage, format: ImageFormat) -> SwapResult<()> {
    let fail = |source: ImageError| SwapError::Write {
        path: path.to_path_buf(),
        source,
    };
    let io_fail = |e: io::Error| fail(ImageError::IoError(e));

    let target = fs::canonicalize(path).map_err(io_fail)?;
    let dir = target.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".rbswap-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_fail)?;
    debug!("encoding {:?} into {}", format, tmp.path().display());

    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        image.write_to(&mut out, format).map_err(fail)?;
        out.flush().map_err(io_fail)?;
    }
    tmp.as_file().sync_all().map_err(io_fail)?;

    let written = encoded_color(tmp.path(), format).map_err(fail)?;
    if written != image.color() {
        return Err(SwapError::DepthLost {
            path: path.to_path_buf(),
            format,
            expected: image.color(),
            written,
        });
    }

    // Keep the original's mode bits instead of the temp file's 0600.
    let meta = fs::metadata(&target).map_err(io_fail)?;
    tmp.as_file()
        .set_permissions(meta.permissions())
        .map_err(io_fail)?;
    tmp.persist(&target).map_err(|e| io_fail(e.error))?;
    debug!("replaced {}", target.display());
    Ok(())
}

/// Color type an encoded file decodes back to, read from its header.
fn encoded_color(path: &Path, format: ImageFormat) -> Result<ColorType, ImageError> {
    let mut reader = ImageReader::open(path)?;
    reader.set_format(format);
    Ok(reader.into_decoder()?.color_type())
}
