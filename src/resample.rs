//! Square, centered, progressively-halved resampling.

use crate::error::{Error, Result};
use crate::raster::{
    compression_for_quality, write_png, EncodedRaster, RenderedIcon,
    MAX_ICO_DIMENSION,
};
use crate::size::TargetSize;
use crate::source::SourceImage;
use fast_image_resize as fr;
use image::imageops;
use image::{Rgba, RgbaImage};

//===========================================================================//

// Used for every resampling step, including the corrective final draw.  The
// resizer premultiplies alpha around the convolution, so the color of
// transparent pixels never reaches visible ones.
const FILTER: fr::ResizeAlg =
    fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3);

//===========================================================================//

/// The region of a square canvas covered by source content, in canvas
/// pixels.  Everything outside it is letterbox.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ContentRect {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl ContentRect {
    fn scaled(&self, factor: f64) -> ContentRect {
        ContentRect {
            left: self.left * factor,
            top: self.top * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
        }
    }

    /// Returns true if the pixel at `(x, y)` lies entirely outside the
    /// content.
    fn excludes_pixel(&self, x: u32, y: u32) -> bool {
        let (x, y) = (x as f64, y as f64);
        x + 1.0 <= self.left
            || x >= self.right
            || y + 1.0 <= self.top
            || y >= self.bottom
    }

    /// Returns true if the pixel at `(x, y)` lies entirely inside the
    /// content.
    fn covers_pixel(&self, x: u32, y: u32) -> bool {
        let (x, y) = (x as f64, y as f64);
        x >= self.left
            && x + 1.0 <= self.right
            && y >= self.top
            && y + 1.0 <= self.bottom
    }
}

//===========================================================================//

/// Renders `source` as a `target` x `target` PNG.  The source is centered on
/// a transparent square canvas first, so it is never cropped or distorted.
/// `quality` must be in (0, 1] and is passed through to the PNG encoder.
pub fn resize(
    source: &SourceImage,
    target: u32,
    quality: f32,
) -> Result<EncodedRaster> {
    if target == 0 || target > MAX_ICO_DIMENSION {
        invalid_input!(
            "Invalid target size (was {}, but must be between 1 and {})",
            target,
            MAX_ICO_DIMENSION
        );
    }
    if !(quality > 0.0 && quality <= 1.0) {
        invalid_input!(
            "Invalid quality (was {}, but must be in (0, 1])",
            quality
        );
    }
    let (canvas, content) = square_canvas(source);
    let side = canvas.width();
    let mut resizer = fr::Resizer::new();
    let mut resized = progressive_halving(&mut resizer, canvas, target)?;
    if resized.width() != target || resized.height() != target {
        tracing::trace!(
            from = resized.width(),
            to = target,
            "Corrective final resample"
        );
        resized = resample(&mut resizer, resized, target, target)?;
    }
    let content = content.scaled(target as f64 / side as f64);
    clear_letterbox(&mut resized, &content);
    if is_opaque(source) {
        fill_opaque_interior(&mut resized, &content);
    }
    let mut data = Vec::new();
    if let Err(error) =
        write_png(&resized, compression_for_quality(quality), &mut data)
    {
        return Err(Error::Encode { size: target, reason: error.to_string() });
    }
    tracing::debug!(
        size = target,
        source_width = source.width(),
        source_height = source.height(),
        bytes = data.len(),
        "Rendered icon"
    );
    Ok(EncodedRaster::new(target, target, data))
}

/// Renders `source` at one of the supported icon sizes.
pub fn render(
    source: &SourceImage,
    size: TargetSize,
    quality: f32,
) -> Result<RenderedIcon> {
    let raster = resize(source, size.pixels(), quality)?;
    Ok(RenderedIcon::new(size, raster))
}

//===========================================================================//

/// Places the source at the center of a fully transparent square canvas
/// whose side is the source's longer edge.
fn square_canvas(source: &SourceImage) -> (RgbaImage, ContentRect) {
    let width = source.width();
    let height = source.height();
    let side = width.max(height);
    let left = (side - width) / 2;
    let top = (side - height) / 2;
    let content = ContentRect {
        left: left as f64,
        top: top as f64,
        right: (left + width) as f64,
        bottom: (top + height) as f64,
    };
    if side == width && side == height {
        return (source.pixels().clone(), content);
    }
    let mut canvas = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
    imageops::replace(&mut canvas, source.pixels(), left as i64, top as i64);
    (canvas, content)
}

/// Returns the side lengths a canvas of `side` pixels passes through on its
/// way down to `target`.  Each step is at least half the previous one and
/// never below `target`; the list is empty if `side <= target`.
fn halving_steps(side: u32, target: u32) -> Vec<u32> {
    let mut steps = Vec::new();
    let mut current = side;
    while current > target {
        current = target.max(current / 2);
        steps.push(current);
    }
    steps
}

/// Shrinks a square canvas toward `target` along `halving_steps`.  Returns
/// the canvas unchanged if it is already no larger than `target`.
fn progressive_halving(
    resizer: &mut fr::Resizer,
    mut canvas: RgbaImage,
    target: u32,
) -> Result<RgbaImage> {
    for next in halving_steps(canvas.width(), target) {
        tracing::trace!(from = canvas.width(), to = next, "Halving step");
        canvas = resample(resizer, canvas, next, target)?;
    }
    Ok(canvas)
}

/// Resamples `image` to `side` x `side`.  Failures are attributed to the
/// icon of edge length `size`.
fn resample(
    resizer: &mut fr::Resizer,
    image: RgbaImage,
    side: u32,
    size: u32,
) -> Result<RgbaImage> {
    let failed = |reason: String| Error::Encode { size, reason };
    let (width, height) = image.dimensions();
    let src = fr::images::Image::from_vec_u8(
        width,
        height,
        image.into_raw(),
        fr::PixelType::U8x4,
    )
    .map_err(|error| failed(error.to_string()))?;
    let mut dst = fr::images::Image::new(side, side, fr::PixelType::U8x4);
    let options = fr::ResizeOptions::new().resize_alg(FILTER);
    resizer
        .resize(&src, &mut dst, Some(&options))
        .map_err(|error| failed(error.to_string()))?;
    match RgbaImage::from_raw(side, side, dst.into_vec()) {
        Some(image) => Ok(image),
        None => {
            Err(failed(format!("Resampled buffer is not {}x{}", side, side)))
        }
    }
}

/// Resets pixels lying wholly in the letterbox margins to full transparency,
/// so filter overshoot can't leave faint color there.
fn clear_letterbox(image: &mut RgbaImage, content: &ContentRect) {
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if content.excludes_pixel(x, y) {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

fn is_opaque(source: &SourceImage) -> bool {
    source.pixels().pixels().all(|pixel| pixel[3] == 255)
}

/// Makes pixels wholly covered by the content of an opaque source fully
/// opaque again, undoing filter undershoot in the alpha channel.
fn fill_opaque_interior(image: &mut RgbaImage, content: &ContentRect) {
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if content.covers_pixel(x, y) {
            pixel[3] = 255;
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{
        halving_steps, progressive_halving, resize, square_canvas,
        ContentRect,
    };
    use crate::error::Error;
    use crate::preprocess::{BackgroundKey, Preprocess};
    use crate::source::SourceImage;
    use fast_image_resize::Resizer;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, color: [u8; 4]) -> SourceImage {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..(width * height) {
            rgba.extend_from_slice(&color);
        }
        SourceImage::from_rgba_data(width, height, rgba).unwrap()
    }

    fn decode(data: &[u8]) -> RgbaImage {
        image::load_from_memory(data).unwrap().to_rgba8()
    }

    #[test]
    fn square_canvas_centers_wide_source() {
        let source = solid(10, 4, [255, 0, 0, 255]);
        let (canvas, content) = square_canvas(&source);
        assert_eq!(canvas.dimensions(), (10, 10));
        assert_eq!(
            content,
            ContentRect { left: 0.0, top: 3.0, right: 10.0, bottom: 7.0 }
        );
        assert_eq!(canvas.get_pixel(0, 2), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(9, 6), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(9, 7), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn square_canvas_centers_tall_source() {
        let source = solid(3, 8, [0, 0, 255, 255]);
        let (canvas, _) = square_canvas(&source);
        assert_eq!(canvas.dimensions(), (8, 8));
        // (8 - 3) / 2 rounds down, so the content starts at column 2.
        assert_eq!(canvas.get_pixel(1, 4)[3], 0);
        assert_eq!(canvas.get_pixel(2, 4)[3], 255);
        assert_eq!(canvas.get_pixel(4, 4)[3], 255);
        assert_eq!(canvas.get_pixel(5, 4)[3], 0);
    }

    #[test]
    fn halving_step_sequences() {
        assert_eq!(halving_steps(300, 16), vec![150, 75, 37, 18, 16]);
        assert_eq!(halving_steps(100, 48), vec![50, 48]);
        assert_eq!(halving_steps(100, 16), vec![50, 25, 16]);
        assert_eq!(halving_steps(100, 60), vec![60]);
        assert!(halving_steps(100, 100).is_empty());
        assert!(halving_steps(10, 128).is_empty());
    }

    #[test]
    fn halving_steps_shrink_at_most_by_half() {
        for side in 1..=600 {
            for &target in &[1, 16, 32, 48, 64, 128, 256] {
                let steps = halving_steps(side, target);
                let mut previous = side;
                for &step in &steps {
                    assert!(step >= previous / 2, "{} -> {}", previous, step);
                    assert!(step < previous);
                    assert!(step >= target);
                    previous = step;
                }
                if side > target {
                    assert_eq!(steps.last(), Some(&target));
                } else {
                    assert!(steps.is_empty());
                }
            }
        }
    }

    #[test]
    fn halving_follows_steps() {
        let mut resizer = Resizer::new();
        let canvas = RgbaImage::new(100, 100);
        let cases = [(16, 16), (48, 48), (100, 100), (128, 100)];
        for &(target, expected) in &cases {
            let halved =
                progressive_halving(&mut resizer, canvas.clone(), target)
                    .unwrap();
            assert_eq!(halved.dimensions(), (expected, expected));
        }
    }

    #[test]
    fn output_is_exact_for_upscale_and_downscale() {
        for &(width, height) in &[(5, 3), (100, 60), (60, 100), (300, 300)] {
            let source = solid(width, height, [1, 2, 3, 255]);
            for &target in &[16, 32, 48, 64, 128, 256] {
                let raster = resize(&source, target, 1.0).unwrap();
                let dimensions = (raster.width(), raster.height());
                assert_eq!(dimensions, (target, target));
                let image = decode(raster.data());
                assert_eq!(image.dimensions(), (target, target));
            }
        }
    }

    #[test]
    fn letterbox_margins_stay_transparent() {
        let source = solid(100, 60, [200, 100, 50, 255]);
        for &target in &[16, 32, 48] {
            let image = decode(resize(&source, target, 1.0).unwrap().data());
            assert_eq!(image.get_pixel(0, 0)[3], 0);
            assert_eq!(image.get_pixel(target - 1, target - 1)[3], 0);
            assert_eq!(image.get_pixel(target / 2, 0)[3], 0);
            let center = image.get_pixel(target / 2, target / 2);
            assert!(center[3] >= 250, "center alpha {}", center[3]);
        }
    }

    #[test]
    fn letterboxed_edges_keep_source_color() {
        let source = solid(100, 60, [200, 100, 50, 255]);
        for &target in &[16, 32, 48, 64, 128] {
            let image = decode(resize(&source, target, 1.0).unwrap().data());
            let mut partial = 0;
            for pixel in image.pixels() {
                if pixel[3] == 0 || pixel[3] == 255 {
                    continue;
                }
                partial += 1;
                if pixel[3] < 32 {
                    continue;
                }
                let expected = [200u8, 100, 50];
                for (channel, &expected) in expected.iter().enumerate() {
                    let actual = pixel[channel];
                    assert!(
                        (actual as i16 - expected as i16).abs() <= 6,
                        "{}px: {:?}",
                        target,
                        pixel
                    );
                }
            }
            assert!(partial > 0, "{}px has no partially covered edge", target);
        }
    }

    #[test]
    fn hidden_background_color_does_not_bleed() {
        // A red square on white; keying makes the white transparent but
        // leaves its color channels in place.
        let mut rgba = Vec::with_capacity(64 * 64 * 4);
        for y in 0..64 {
            for x in 0..64 {
                if (16..48).contains(&x) && (16..48).contains(&y) {
                    rgba.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    rgba.extend_from_slice(&[255, 255, 255, 255]);
                }
            }
        }
        let source = SourceImage::from_rgba_data(64, 64, rgba).unwrap();
        let keyed = BackgroundKey::default().apply(source).unwrap();
        assert_eq!(keyed.rgba_data()[..4], [255, 255, 255, 0]);
        let image = decode(resize(&keyed, 16, 1.0).unwrap().data());
        for pixel in image.pixels().filter(|pixel| pixel[3] > 0) {
            assert!(pixel[0] >= 249, "{:?}", pixel);
            assert!(pixel[1] <= 6 && pixel[2] <= 6, "{:?}", pixel);
        }
        let center = image.get_pixel(8, 8);
        assert!(center[3] >= 250, "center {:?}", center);
    }

    #[test]
    fn letterboxed_opaque_interior_stays_opaque() {
        let source = solid(100, 60, [200, 100, 50, 255]);
        for &target in &[16, 32, 48, 64, 128] {
            let image = decode(resize(&source, target, 1.0).unwrap().data());
            let scale = target as f64 / 100.0;
            let (top, bottom) = (20.0 * scale, 80.0 * scale);
            for (x, y, pixel) in image.enumerate_pixels() {
                let y = y as f64;
                if y >= top && y + 1.0 <= bottom {
                    assert_eq!(pixel[3], 255, "{}px at {},{}", target, x, y);
                }
            }
        }
    }

    #[test]
    fn square_opaque_source_stays_opaque() {
        let source = solid(40, 40, [9, 9, 9, 255]);
        let image = decode(resize(&source, 16, 1.0).unwrap().data());
        assert!(image.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn invalid_parameters() {
        let source = solid(4, 4, [0, 0, 0, 255]);
        for &(target, quality) in
            &[(0, 1.0), (257, 1.0), (16, 0.0), (16, 1.01), (16, f32::NAN)]
        {
            let error = resize(&source, target, quality);
            assert!(matches!(error, Err(Error::InvalidInput(_))));
        }
    }
}

//===========================================================================//
