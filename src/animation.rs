//! Looping animation of the body sliding to the right.
//!
//! Rendering is split in three steps that never share mutable state:
//!
//! 1. [`AnimationPlan`] fixes the frame count and the viewport up front, so the
//!    marker never leaves the frame.
//! 2. [`FrameRasterizer`] draws one frame from `(frame_index, acceleration, fps)`.
//! 3. An [`AnimationEncoder`] turns the ordered frames into a looping image.
//!
//! [`render_animation`] drives the three steps through a temporary file that is
//! removed on every exit path, including encoder failure.

use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage, RgbaImage};
use plotters::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::kinematics::position_at;

/// Frame rate used unless configured otherwise.
pub const DEFAULT_FPS: u32 = 20;

/// Headroom added to the furthest position when sizing the viewport.
pub const VIEWPORT_HEADROOM: f64 = 1.2;

/// Viewport width used when the body never leaves the origin.
const MIN_VIEWPORT_WIDTH: f64 = 1.0;

/// Marker width as a fraction of the viewport width.
const MARKER_FRACTION: f64 = 0.04;

/// Absorbs representation error in `duration × fps` (4.35 × 20 is
/// 86.99999999999999).
const FRAME_COUNT_EPSILON: f64 = 1e-9;

/// Errors that can occur while producing the animation.
///
/// None of these are fatal to a recompute pass: the caller downgrades them to
/// a warning.
#[derive(Error, Debug)]
pub enum AnimationEncodingError {
    /// Frame rate of zero
    #[error("frame rate must be positive")]
    InvalidFrameRate,

    /// Duration too short for a single frame
    #[error("{duration} s at {fps} fps yields no frames")]
    NoFrames { duration: f64, fps: u32 },

    /// No encoder is registered for the requested format
    #[error("no animation encoder available for format: {0}")]
    Unavailable(String),

    /// A frame could not be drawn
    #[error("failed to draw frame {index}: {reason}")]
    Frame { index: usize, reason: String },

    /// The encoder rejected the frames
    #[error("encoder failed: {0}")]
    Encode(String),

    /// Temporary file could not be created, written or read back
    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Number of frames for `duration` seconds at `fps`: `floor(duration × fps)`.
pub fn total_frames(duration: f64, fps: u32) -> usize {
    // Negative and NaN products saturate to zero
    (duration * f64::from(fps) + FRAME_COUNT_EPSILON).floor() as usize
}

/// Position of the body in frame `frame_index`.
pub fn object_position(frame_index: usize, acceleration: f64, fps: u32) -> f64 {
    position_at(acceleration, frame_index as f64 / f64::from(fps))
}

/// Horizontal extent shown in every frame (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
}

impl Viewport {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x)
    }
}

/// One discrete state of the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub frame_index: usize,
    pub object_position: f64,
}

/// Everything fixed before the first frame is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationPlan {
    pub acceleration: f64,
    pub fps: u32,
    pub total_frames: usize,
    pub viewport: Viewport,
}

impl AnimationPlan {
    pub fn new(
        acceleration: f64,
        duration: f64,
        fps: u32,
    ) -> Result<Self, AnimationEncodingError> {
        if fps == 0 {
            return Err(AnimationEncodingError::InvalidFrameRate);
        }
        let total_frames = total_frames(duration, fps);
        if total_frames == 0 {
            return Err(AnimationEncodingError::NoFrames { duration, fps });
        }

        let max_position = object_position(total_frames - 1, acceleration, fps);
        let x_max = max_position * VIEWPORT_HEADROOM;
        let x_max = if x_max > 0.0 { x_max } else { MIN_VIEWPORT_WIDTH };

        Ok(Self {
            acceleration,
            fps,
            total_frames,
            viewport: Viewport { x_min: 0.0, x_max },
        })
    }

    /// Position reached in the last frame.
    pub fn max_position(&self) -> f64 {
        object_position(self.total_frames - 1, self.acceleration, self.fps)
    }

    /// Frames in increasing index order, starting at 0 on every call.
    pub fn frames(&self) -> impl Iterator<Item = AnimationFrame> + '_ {
        (0..self.total_frames).map(|frame_index| AnimationFrame {
            frame_index,
            object_position: object_position(frame_index, self.acceleration, self.fps),
        })
    }

    /// Display time of each frame
    pub fn frame_delay(&self) -> Delay {
        Delay::from_numer_denom_ms(1000, self.fps)
    }
}

/// Pixel size of each animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 600,
            height: 180,
        }
    }
}

/// Draws single frames: a ground line with ticks and a block at the body's
/// position. No text is drawn, so no font backend is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRasterizer {
    pub size: FrameSize,
}

impl FrameRasterizer {
    pub fn new(size: FrameSize) -> Self {
        Self { size }
    }

    pub fn render(
        &self,
        plan: &AnimationPlan,
        frame: &AnimationFrame,
    ) -> Result<RgbaImage, AnimationEncodingError> {
        let FrameSize { width, height } = self.size;
        let frame_err = |e: &dyn std::fmt::Display| AnimationEncodingError::Frame {
            index: frame.frame_index,
            reason: e.to_string(),
        };

        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .filter(|&len| len > 0)
            .ok_or_else(|| AnimationEncodingError::Frame {
                index: frame.frame_index,
                reason: format!("unusable frame size {width}x{height}"),
            })?;

        let mut buffer = vec![0u8; len];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| frame_err(&e))?;

            let Viewport { x_min, x_max } = plan.viewport;
            let mut chart = ChartBuilder::on(&root)
                .margin(12)
                .build_cartesian_2d(x_min..x_max, -0.5..0.5)
                .map_err(|e| frame_err(&e))?;

            let ground = -0.2;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x_min, ground), (x_max, ground)],
                    BLACK.stroke_width(2),
                )))
                .map_err(|e| frame_err(&e))?;

            let step = plan.viewport.width() / 10.0;
            chart
                .draw_series((0..=10).map(|k| {
                    let x = x_min + step * f64::from(k);
                    PathElement::new(
                        vec![(x, ground), (x, ground - 0.08)],
                        RGBColor(128, 128, 128).stroke_width(1),
                    )
                }))
                .map_err(|e| frame_err(&e))?;

            let left = frame.object_position;
            let right = left + plan.viewport.width() * MARKER_FRACTION;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(left, ground), (right, 0.2)],
                    BLUE.filled(),
                )))
                .map_err(|e| frame_err(&e))?;

            root.present().map_err(|e| frame_err(&e))?;
        }

        let rgb = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            AnimationEncodingError::Frame {
                index: frame.frame_index,
                reason: "frame buffer has the wrong size".to_string(),
            }
        })?;
        Ok(DynamicImage::ImageRgb8(rgb).into_rgba8())
    }
}

/// Lazily rendered frames in display order.
pub type FrameStream<'a> = dyn Iterator<Item = Result<RgbaImage, AnimationEncodingError>> + 'a;

/// Encodes an ordered frame sequence into a looping image.
pub trait AnimationEncoder {
    /// Identifier of the produced format (also used as file extension)
    fn format_id(&self) -> &str;

    /// Consume `frames` in order and write the encoded animation to `out`
    fn encode(
        &self,
        plan: &AnimationPlan,
        frames: &mut FrameStream<'_>,
        out: &mut dyn Write,
    ) -> Result<(), AnimationEncodingError>;
}

/// Animated GIF that repeats forever.
#[derive(Debug, Clone, Copy)]
pub struct GifAnimationEncoder {
    /// Color quantization speed, 1 (best) to 30 (fastest)
    pub speed: i32,
}

impl Default for GifAnimationEncoder {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

impl AnimationEncoder for GifAnimationEncoder {
    fn format_id(&self) -> &str {
        "gif"
    }

    fn encode(
        &self,
        plan: &AnimationPlan,
        frames: &mut FrameStream<'_>,
        out: &mut dyn Write,
    ) -> Result<(), AnimationEncodingError> {
        let encode_err = |e: image::ImageError| AnimationEncodingError::Encode(e.to_string());

        let mut encoder = GifEncoder::new_with_speed(out, self.speed);
        encoder.set_repeat(Repeat::Infinite).map_err(encode_err)?;

        let delay = plan.frame_delay();
        for frame in frames {
            encoder
                .encode_frame(Frame::from_parts(frame?, 0, 0, delay))
                .map_err(encode_err)?;
        }
        Ok(())
    }
}

/// Look up an encoder by format id (case-insensitive).
pub fn encoder_for_format(
    format: &str,
) -> Result<Box<dyn AnimationEncoder>, AnimationEncodingError> {
    if format.eq_ignore_ascii_case("gif") {
        Ok(Box::new(GifAnimationEncoder::default()))
    } else {
        Err(AnimationEncodingError::Unavailable(format.to_string()))
    }
}

/// An encoded looping animation, read back into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAnimation {
    pub format: String,
    pub bytes: Vec<u8>,
    pub frame_count: usize,
    pub fps: u32,
    pub size: FrameSize,
    /// Horizontal range shown in every frame (m)
    pub viewport: Viewport,
}

impl EncodedAnimation {
    pub fn file_name(&self) -> String {
        format!("animation.{}", self.format)
    }
}

/// Render and encode the animation using the system temporary directory.
pub fn render_animation(
    plan: &AnimationPlan,
    rasterizer: &FrameRasterizer,
    encoder: &dyn AnimationEncoder,
) -> Result<EncodedAnimation, AnimationEncodingError> {
    render_animation_in(&std::env::temp_dir(), plan, rasterizer, encoder)
}

/// Render and encode the animation through a temporary file in `dir`.
///
/// The file is deleted when this function returns, whether encoding
/// succeeded or not.
pub fn render_animation_in(
    dir: &Path,
    plan: &AnimationPlan,
    rasterizer: &FrameRasterizer,
    encoder: &dyn AnimationEncoder,
) -> Result<EncodedAnimation, AnimationEncodingError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("newtonsim-")
        .suffix(&format!(".{}", encoder.format_id()))
        .tempfile_in(dir)?;
    debug!(
        path = %tmp.path().display(),
        frames = plan.total_frames,
        fps = plan.fps,
        "encoding animation"
    );

    let mut frames = plan.frames().map(|frame| rasterizer.render(plan, &frame));
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encoder.encode(plan, &mut frames, &mut writer)?;
        writer.flush()?;
    }

    let file = tmp.as_file_mut();
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    debug!(bytes = bytes.len(), "animation encoded");

    Ok(EncodedAnimation {
        format: encoder.format_id().to_string(),
        bytes,
        frame_count: plan.total_frames,
        fps: plan.fps,
        size: rasterizer.size,
        viewport: plan.viewport,
    })
}
