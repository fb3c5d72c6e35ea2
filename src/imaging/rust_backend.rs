//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, BMP, TIFF, GIF) | `image` crate (pure Rust decoders) |
//! | Decode (AVIF) | `avif-parse` (container) + `rav1d` (AV1) + BT.601 YUV→RGB |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder::new_with_quality` (`Best` compression when optimizing) |
//! | Encode → WebP | RGB quantization by quality + `WebPEncoder::new_lossless` |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) |
//! | Encode → BMP, TIFF, GIF | `DynamicImage::write_to` with codec defaults |
//!
//! The `image` crate's `"avif"` feature is encoder-only, hence the separate
//! AVIF decode path. HEIC/HEIF has no pure-Rust codec at all and fails with
//! [`BackendError::Unsupported`].

use super::backend::{BackendError, Image, ImageBackend};
use super::format::ImageFormatKind;
use super::params::{EncodeParams, EncodeSettings, Quality};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// rav1e speed preset: 1 is slowest/best, 10 fastest.
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_error(format: ImageFormatKind, err: image::ImageError) -> BackendError {
    BackendError::Encode(format!("{format}: {err}"))
}

fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality.value() as u8);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| encode_error(ImageFormatKind::Jpeg, e))?;
    Ok(buffer)
}

fn encode_png(img: &DynamicImage, optimize: bool) -> Result<Vec<u8>, BackendError> {
    let mut buffer = Vec::new();
    let compression = if optimize {
        CompressionType::Best
    } else {
        CompressionType::Default
    };
    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut buffer),
        compression,
        image::codecs::png::FilterType::Adaptive,
    );
    img.write_with_encoder(encoder)
        .map_err(|e| encode_error(ImageFormatKind::Png, e))?;
    Ok(buffer)
}

/// WebP through the pure-Rust lossless encoder. Below quality 100 the RGB
/// channels are quantized first so lower quality still buys a smaller file.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut rgba = img.to_rgba8();
    quantize_rgb(rgba.as_mut(), quality);
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(rgba)
        .write_with_encoder(WebPEncoder::new_lossless(Cursor::new(&mut buffer)))
        .map_err(|e| encode_error(ImageFormatKind::WebP, e))?;
    Ok(buffer)
}

fn encode_avif(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buffer = Vec::new();
    let encoder = AvifEncoder::new_with_speed_quality(
        Cursor::new(&mut buffer),
        AVIF_SPEED,
        quality.value() as u8,
    );
    img.write_with_encoder(encoder)
        .map_err(|e| encode_error(ImageFormatKind::Avif, e))?;
    Ok(buffer)
}

fn encode_with_defaults(
    img: &DynamicImage,
    kind: ImageFormatKind,
    format: ImageFormat,
) -> Result<Vec<u8>, BackendError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format)
        .map_err(|e| encode_error(kind, e))?;
    Ok(cursor.into_inner())
}

fn avif_error(stage: &str, detail: impl std::fmt::Display) -> BackendError {
    BackendError::Decode(format!("AVIF {stage}: {detail}"))
}

/// Decode an AVIF still from memory: `avif-parse` extracts the primary AV1
/// item from the container, `rav1d` decodes it to YUV planes.
fn decode_avif(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use rav1d::src::lib as dav1d;
    use std::mem::MaybeUninit;
    use std::ptr::NonNull;

    let avif = avif_parse::read_avif(&mut Cursor::new(bytes))
        .map_err(|e| avif_error("container", format!("{e:?}")))?;
    let payload: &[u8] = &avif.primary_item;

    let mut settings = MaybeUninit::<Dav1dSettings>::uninit();
    unsafe { dav1d::dav1d_default_settings(NonNull::from(&mut settings).cast()) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc = unsafe { dav1d::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(avif_error("decoder open", rc.0));
    }

    let mut data = Dav1dData::default();
    let buf = unsafe { dav1d::dav1d_data_create(NonNull::new(&mut data), payload.len()) };
    if buf.is_null() {
        unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(avif_error("buffer", "allocation failed"));
    }
    unsafe { std::ptr::copy_nonoverlapping(payload.as_ptr(), buf, payload.len()) };

    let rc = unsafe { dav1d::dav1d_send_data(ctx, NonNull::new(&mut data)) };
    if rc.0 != 0 {
        unsafe {
            dav1d::dav1d_data_unref(NonNull::new(&mut data));
            dav1d::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(avif_error("send data", rc.0));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { dav1d::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(avif_error("get picture", rc.0));
    }

    let frame = unsafe { YuvFrame::from_picture(&pic) };
    let rgb = frame.map(|frame| (frame.width, frame.height, frame.to_rgb()));
    unsafe {
        dav1d::dav1d_picture_unref(NonNull::new(&mut pic));
        dav1d::dav1d_close(NonNull::new(&mut ctx));
    }

    let (width, height, rgb) = rgb?;
    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| avif_error("picture", "plane data shorter than frame"))
}

/// One plane of a decoded picture, borrowed from the decoder.
struct Plane<'a> {
    data: &'a [u8],
    stride: usize,
}

impl Plane<'_> {
    /// Sample at `(x, y)`; planes deeper than 8 bits store native-endian u16.
    fn sample(&self, x: usize, y: usize, high_depth: bool) -> f32 {
        if high_depth {
            let i = y * self.stride + x * 2;
            f32::from(u16::from_ne_bytes([self.data[i], self.data[i + 1]]))
        } else {
            f32::from(self.data[y * self.stride + x])
        }
    }
}

struct Chroma<'a> {
    u: Plane<'a>,
    v: Plane<'a>,
    subsample_x: bool,
    subsample_y: bool,
}

struct YuvFrame<'a> {
    luma: Plane<'a>,
    /// `None` for monochrome (I400).
    chroma: Option<Chroma<'a>>,
    width: u32,
    height: u32,
    bits: u32,
}

impl<'a> YuvFrame<'a> {
    /// Borrow the planes of a picture returned by `dav1d_get_picture`.
    ///
    /// # Safety
    ///
    /// `pic` must hold a successfully decoded picture that is not unreferenced
    /// while the returned frame is alive.
    unsafe fn from_picture(
        pic: &'a rav1d::include::dav1d::picture::Dav1dPicture,
    ) -> Result<Self, BackendError> {
        use rav1d::include::dav1d::headers::{
            DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
            DAV1D_PIXEL_LAYOUT_I444,
        };

        let width = pic.p.w as u32;
        let height = pic.p.h as u32;
        let bits = pic.p.bpc as u32;

        let plane = |index: usize, stride: isize, rows: u32| -> Result<Plane<'a>, BackendError> {
            let ptr = pic.data[index].ok_or_else(|| avif_error("picture", "missing plane"))?;
            let stride = usize::try_from(stride)
                .map_err(|_| avif_error("picture", "negative plane stride"))?;
            let data = unsafe {
                std::slice::from_raw_parts(ptr.as_ptr() as *const u8, stride * rows as usize)
            };
            Ok(Plane { data, stride })
        };

        let luma = plane(0, pic.stride[0], height)?;
        let (subsample_x, subsample_y) = match pic.p.layout {
            DAV1D_PIXEL_LAYOUT_I400 => {
                return Ok(Self {
                    luma,
                    chroma: None,
                    width,
                    height,
                    bits,
                });
            }
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            other => return Err(avif_error("pixel layout", other)),
        };
        let chroma_rows = if subsample_y { height.div_ceil(2) } else { height };

        Ok(Self {
            luma,
            chroma: Some(Chroma {
                u: plane(1, pic.stride[1], chroma_rows)?,
                v: plane(2, pic.stride[1], chroma_rows)?,
                subsample_x,
                subsample_y,
            }),
            width,
            height,
            bits,
        })
    }

    /// Interleaved RGB8 using BT.601 coefficients.
    fn to_rgb(&self) -> Vec<u8> {
        let max = ((1u32 << self.bits) - 1) as f32;
        let center = (1u32 << (self.bits - 1)) as f32;
        let to_8bit = 255.0 / max;
        let high_depth = self.bits > 8;
        let (width, height) = (self.width as usize, self.height as usize);

        let mut rgb = Vec::with_capacity(width * height * 3);
        for row in 0..height {
            for col in 0..width {
                let y = self.luma.sample(col, row, high_depth);
                let (r, g, b) = match &self.chroma {
                    None => (y, y, y),
                    Some(c) => {
                        let cx = if c.subsample_x { col / 2 } else { col };
                        let cy = if c.subsample_y { row / 2 } else { row };
                        let cb = c.u.sample(cx, cy, high_depth) - center;
                        let cr = c.v.sample(cx, cy, high_depth) - center;
                        (
                            y + 1.402 * cr,
                            y - 0.344136 * cb - 0.714136 * cr,
                            y + 1.772 * cb,
                        )
                    }
                };
                for channel in [r, g, b] {
                    rgb.push((channel * to_8bit).clamp(0.0, 255.0) as u8);
                }
            }
        }
        rgb
    }
}

/// Reduce each RGB channel to a palette whose size shrinks with quality.
/// Alpha is left untouched.
fn quantize_rgb(data: &mut [u8], quality: Quality) {
    let levels = quantization_levels(quality);
    if levels >= 256 {
        return;
    }
    let step = 255.0 / (levels as f32 - 1.0);
    for pixel in data.chunks_exact_mut(4) {
        for channel in pixel.iter_mut().take(3) {
            let bucket = (f32::from(*channel) / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Levels per channel: 256 at quality 100, falling off quadratically to 2.
fn quantization_levels(quality: Quality) -> u16 {
    if quality.value() >= 100 {
        return 256;
    }
    let normalized = quality.value() as f32 / 100.0;
    let levels = 2.0 + normalized * normalized * 254.0;
    levels.round().clamp(2.0, 256.0) as u16
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8], format: ImageFormatKind) -> Result<Image, BackendError> {
        let pixels = match format {
            ImageFormatKind::Heif => return Err(BackendError::Unsupported(format)),
            ImageFormatKind::Avif => decode_avif(bytes)?,
            _ => ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()?
                .decode()
                .map_err(|e| BackendError::Decode(format!("{format}: {e}")))?,
        };
        Ok(Image::new(pixels, format))
    }

    fn resize(&self, image: &Image, width: u32, height: u32) -> Result<Image, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Resize(format!(
                "target {width}x{height} has a zero edge"
            )));
        }
        let resized = image
            .pixels()
            .resize_exact(width, height, FilterType::Lanczos3);
        Ok(Image::new(resized, image.format()))
    }

    fn encode(&self, image: &Image, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let img = image.pixels();
        let quality = params.settings.quality().unwrap_or_default();

        match params.format {
            ImageFormatKind::Jpeg => encode_jpeg(img, quality),
            ImageFormatKind::Png => {
                let optimize =
                    matches!(params.settings, EncodeSettings::Lossless { optimize: true });
                encode_png(img, optimize)
            }
            ImageFormatKind::WebP => encode_webp(img, quality),
            ImageFormatKind::Avif => encode_avif(img, quality),
            kind @ (ImageFormatKind::Bmp | ImageFormatKind::Tiff | ImageFormatKind::Gif) => {
                match kind.image_format() {
                    Some(format) => encode_with_defaults(img, kind, format),
                    None => Err(BackendError::Unsupported(kind)),
                }
            }
            kind @ (ImageFormatKind::Heif | ImageFormatKind::Other) => {
                Err(BackendError::Unsupported(kind))
            }
        }
    }
}
