// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod config;
pub mod gray;
pub mod render;

pub use config::RingConfig;
pub use gray::InvalidBitCount;
pub use render::Surface;

// External crate imports
use bon::Builder;
use pixels::{Pixels, SurfaceTexture};

// Standard library imports
use std::sync::mpsc::Receiver;
use std::time::Instant;

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color representation for disc and instrumentation elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for type-safe encoder updates over a channel
#[derive(Debug, Clone)]
pub enum EncoderCommand {
    SetBitCount(u32),
    SetInnerRadius(f64),
    SetOuterRadius(f64),
    SetInvertTracks(bool),
    SetInstrumentation(bool),
}

#[derive(Debug, Clone, Builder)]
pub struct EncoderConfig {
    #[builder(default = "Grays Encoder".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 600)]
    pub window_width: usize,
    #[builder(default = 600)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Initial disc geometry
    #[builder(default = 2)]
    pub bit_count: u32,
    #[builder(default = 100.0)]
    pub inner_radius: f64,
    #[builder(default = 150.0)]
    pub outer_radius: f64,
    #[builder(default = false)]
    pub invert_tracks: bool,
    #[builder(default = false)]
    pub instrumentation: bool,

    // Colors
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub background_color: Color,
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub track_color: Color,
    #[builder(default = Color::new(0xff, 0x00, 0x00))]
    pub instrumentation_color: Color,
}

/// Main encoder struct - owns the ring geometry and the cached Gray
/// sequence, regenerating it lazily when the bit count changes.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
    ring: RingConfig,
    sequence: Vec<u32>,
    dirty: bool,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        let ring = RingConfig::new(
            config.bit_count,
            config.inner_radius,
            config.outer_radius,
            config.invert_tracks,
            config.instrumentation,
        );
        Self {
            config,
            ring,
            sequence: Vec::new(),
            dirty: true,
        }
    }

    pub fn ring(&self) -> &RingConfig {
        &self.ring
    }

    pub fn set_bit_count(&mut self, bit_count: u32) {
        if self.ring.set_bit_count(bit_count) {
            self.dirty = true;
        }
    }

    pub fn set_inner_radius(&mut self, radius: f64) {
        self.ring.set_inner_radius(radius);
    }

    pub fn set_outer_radius(&mut self, radius: f64) {
        self.ring.set_outer_radius(radius);
    }

    pub fn set_invert_tracks(&mut self, invert: bool) {
        self.ring.set_invert_tracks(invert);
    }

    pub fn set_instrumentation(&mut self, enabled: bool) {
        self.ring.set_instrumentation(enabled);
    }

    /// The current Gray sequence, regenerated first if the bit count
    /// changed since the last call.
    pub fn sequence(&mut self) -> &[u32] {
        self.refresh_sequence();
        &self.sequence
    }

    /// Renders the disc onto `surface`. Color state on the surface is
    /// left as the caller configured it.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        self.refresh_sequence();
        render::render(&self.sequence, &self.ring, surface);
    }

    pub fn show(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<EncoderCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn refresh_sequence(&mut self) {
        if self.dirty || self.sequence.is_empty() {
            // The bit count is clamped on every mutation path.
            self.sequence =
                gray::generate(self.ring.bit_count()).expect("bit count clamped to valid range");
            self.dirty = false;
        }
    }

    fn apply_command(&mut self, command: EncoderCommand) {
        match command {
            EncoderCommand::SetBitCount(bit_count) => self.set_bit_count(bit_count),
            EncoderCommand::SetInnerRadius(radius) => self.set_inner_radius(radius),
            EncoderCommand::SetOuterRadius(radius) => self.set_outer_radius(radius),
            EncoderCommand::SetInvertTracks(invert) => self.set_invert_tracks(invert),
            EncoderCommand::SetInstrumentation(enabled) => self.set_instrumentation(enabled),
        }
    }

    fn render_frame(&mut self, frame: &mut [u8], width: usize, height: usize, zoom: f64) {
        let mut canvas = Canvas::new(frame, width, height);
        let mut scene = Scene::new();
        scene.clear(self.config.background_color);
        scene.set_fill_color(self.config.track_color);
        scene.set_stroke_color(self.config.instrumentation_color);
        self.render(&mut scene);
        scene.render(&mut canvas, width as f64 / 2.0, height as f64 / 2.0, zoom);
    }

    fn run_window(
        &mut self,
        receiver: Option<Receiver<EncoderCommand>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let logical_width: usize = self.config.window_width;
        let logical_height: usize = self.config.window_height;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                logical_width as f64,
                logical_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let mut zoom = 1.0f64;

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / self.config.max_framerate);
        let mut last_frame = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y as f64,
                            MouseScrollDelta::PixelDelta(position) => position.y,
                        };
                        if scroll > 0.0 {
                            zoom *= 1.25;
                        } else if scroll < 0.0 {
                            zoom *= 0.75;
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            while let Ok(command) = receiver.try_recv() {
                                self.apply_command(command);
                            }
                        }

                        let frame = pixels.frame_mut();
                        self.render_frame(frame, fb_width, fb_height, zoom);
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug)]
enum DrawCommand {
    Clear(Color),
    ArcSegment {
        radius: f64,
        width: f64,
        start_deg: f64,
        sweep_deg: f64,
        color: Color,
    },
    Circle {
        radius: f64,
        color: Color,
    },
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: Color,
    },
}

/// Retained list of draw commands in diagram space (origin at the ring
/// center, angles in degrees). Collects output from the renderer and
/// rasterizes it onto a [`Canvas`] in one pass.
pub struct Scene {
    commands: Vec<DrawCommand>,
    fill: Color,
    stroke: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            fill: Color::new(0xff, 0xff, 0xff),
            stroke: Color::new(0xff, 0x00, 0x00),
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    /// Rasterizes the command list onto `canvas`, centered on `(cx, cy)`
    /// and scaled by `zoom`. Stroke width stays at one pixel regardless
    /// of zoom.
    pub fn render(&self, canvas: &mut Canvas, cx: f64, cy: f64, zoom: f64) {
        for command in &self.commands {
            match *command {
                DrawCommand::Clear(color) => {
                    canvas.fill(color);
                }
                DrawCommand::ArcSegment {
                    radius,
                    width,
                    start_deg,
                    sweep_deg,
                    color,
                } => {
                    fill_annulus_segment(
                        canvas,
                        cx,
                        cy,
                        radius * zoom,
                        (radius + width) * zoom,
                        start_deg,
                        sweep_deg,
                        color,
                    );
                }
                DrawCommand::Circle { radius, color } => {
                    stroke_circle_aa(canvas, cx, cy, radius * zoom, color);
                }
                DrawCommand::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    color,
                } => {
                    draw_line_aa(
                        canvas,
                        cx + x0 * zoom,
                        cy + y0 * zoom,
                        cx + x1 * zoom,
                        cy + y1 * zoom,
                        1.0,
                        color,
                    );
                }
            }
        }
    }
}

impl Surface for Scene {
    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn fill_arc_segment(&mut self, radius: f64, width: f64, start_deg: f64, sweep_deg: f64) {
        self.commands.push(DrawCommand::ArcSegment {
            radius,
            width,
            start_deg,
            sweep_deg,
            color: self.fill,
        });
    }

    fn stroke_circle(&mut self, radius: f64) {
        self.commands.push(DrawCommand::Circle {
            radius,
            color: self.stroke,
        });
    }

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.commands.push(DrawCommand::Line {
            x0,
            y0,
            x1,
            y1,
            color: self.stroke,
        });
    }
}

// ============================================================================
// CORE DATA TYPES
// ============================================================================

/// RGBA framebuffer view, four bytes per pixel.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn fill(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn set_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, r: u8, g: u8, b: u8, alpha: f32) {
    if x < width && y < frame.len() / (width * 4) {
        let idx = (y * width + x) * 4;
        let src = [r as f32, g as f32, b as f32, 255.0 * alpha];
        let dst = [
            frame[idx] as f32,
            frame[idx + 1] as f32,
            frame[idx + 2] as f32,
            frame[idx + 3] as f32,
        ];
        let a = src[3] / 255.0;
        let out = [
            (src[0] * a + dst[0] * (1.0 - a)).round() as u8,
            (src[1] * a + dst[1] * (1.0 - a)).round() as u8,
            (src[2] * a + dst[2] * (1.0 - a)).round() as u8,
            0xff,
        ];
        frame[idx..idx + 4].copy_from_slice(&out);
    }
}

fn fill_annulus_segment(
    canvas: &mut Canvas,
    cx: f64,
    cy: f64,
    inner: f64,
    outer: f64,
    start_deg: f64,
    sweep_deg: f64,
    color: Color,
) {
    let full_circle = sweep_deg >= 360.0 - 1e-9;
    let start = start_deg.rem_euclid(360.0);

    let min_x = ((cx - outer).floor() as i32 - 2).max(0);
    let max_x = ((cx + outer).ceil() as i32 + 2).min(canvas.width as i32 - 1);
    let min_y = ((cy - outer).floor() as i32 - 2).max(0);
    let max_y = ((cy + outer).ceil() as i32 + 2).min(canvas.height as i32 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let dist = (dx * dx + dy * dy).sqrt();

            let radial_alpha = if dist < inner - 1.0 {
                0.0
            } else if dist < inner + 1.0 {
                ((dist - (inner - 1.0)) / 2.0).clamp(0.0, 1.0)
            } else if dist <= outer - 1.0 {
                1.0
            } else if dist <= outer + 1.0 {
                1.0 - ((dist - (outer - 1.0)) / 2.0).clamp(0.0, 1.0)
            } else {
                0.0
            };

            if radial_alpha <= 0.01 {
                continue;
            }

            if !full_circle {
                let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
                let relative = (angle - start).rem_euclid(360.0);
                if relative >= sweep_deg {
                    continue;
                }
            }

            set_pixel(
                canvas.frame,
                canvas.width,
                x as usize,
                y as usize,
                color.r,
                color.g,
                color.b,
                radial_alpha as f32,
            );
        }
    }
}

fn stroke_circle_aa(canvas: &mut Canvas, cx: f64, cy: f64, radius: f64, color: Color) {
    let min_x = ((cx - radius).floor() as i32 - 3).max(0);
    let max_x = ((cx + radius).ceil() as i32 + 3).min(canvas.width as i32 - 1);
    let min_y = ((cy - radius).floor() as i32 - 3).max(0);
    let max_y = ((cy + radius).ceil() as i32 + 3).min(canvas.height as i32 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let aa = (1.0 - ((dist - radius).abs() - 0.5).max(0.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                set_pixel(
                    canvas.frame,
                    canvas.width,
                    x as usize,
                    y as usize,
                    color.r,
                    color.g,
                    color.b,
                    aa as f32,
                );
            }
        }
    }
}

fn draw_line_aa(
    canvas: &mut Canvas,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    thickness: f32,
    color: Color,
) {
    let (x0, y0) = (x0.round() as i32, y0.round() as i32);
    let (x1, y1) = (x1.round() as i32, y1.round() as i32);

    let min_x = (x0.min(x1) - thickness.ceil() as i32 - 1).max(0);
    let max_x = (x0.max(x1) + thickness.ceil() as i32 + 1).min(canvas.width as i32 - 1);
    let min_y = (y0.min(y1) - thickness.ceil() as i32 - 1).max(0);
    let max_y = (y0.max(y1) + thickness.ceil() as i32 + 1).min(canvas.height as i32 - 1);

    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = (dx * dx + dy * dy).max(1.0);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0 as f32;
            let py = y as f32 - y0 as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                set_pixel(
                    canvas.frame,
                    canvas.width,
                    x as usize,
                    y as usize,
                    color.r,
                    color.g,
                    color.b,
                    aa,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: usize, x: usize, y: usize) -> (u8, u8, u8) {
        let idx = (y * width + x) * 4;
        (frame[idx], frame[idx + 1], frame[idx + 2])
    }

    #[test]
    fn scene_records_commands_with_current_colors() {
        let mut scene = Scene::new();
        scene.set_fill_color(Color::new(1, 2, 3));
        scene.fill_arc_segment(10.0, 5.0, 0.0, 90.0);
        scene.set_stroke_color(Color::new(4, 5, 6));
        scene.stroke_circle(10.0);

        assert_eq!(scene.commands.len(), 2);
        match scene.commands[0] {
            DrawCommand::ArcSegment { color, .. } => assert_eq!(color, Color::new(1, 2, 3)),
            ref other => panic!("unexpected command {other:?}"),
        }
        match scene.commands[1] {
            DrawCommand::Circle { color, .. } => assert_eq!(color, Color::new(4, 5, 6)),
            ref other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn annulus_segment_paints_inside_the_band_only() {
        let mut frame = vec![0u8; 64 * 64 * 4];
        let mut canvas = Canvas::new(&mut frame, 64, 64);
        let white = Color::new(0xff, 0xff, 0xff);
        // Left half annulus between radii 10 and 16.
        fill_annulus_segment(&mut canvas, 32.0, 32.0, 10.0, 16.0, 90.0, 180.0, white);

        // Mid-band on the left side is painted.
        assert_eq!(pixel(&frame, 64, 32 - 13, 32), (0xff, 0xff, 0xff));
        // Same distance on the right side lies outside the sweep.
        assert_eq!(pixel(&frame, 64, 32 + 13, 32), (0, 0, 0));
        // Center and far field untouched.
        assert_eq!(pixel(&frame, 64, 32, 32), (0, 0, 0));
        assert_eq!(pixel(&frame, 64, 32 - 25, 32), (0, 0, 0));
    }

    #[test]
    fn full_sweep_fills_the_whole_annulus() {
        let mut frame = vec![0u8; 64 * 64 * 4];
        let mut canvas = Canvas::new(&mut frame, 64, 64);
        let white = Color::new(0xff, 0xff, 0xff);
        fill_annulus_segment(&mut canvas, 32.0, 32.0, 10.0, 16.0, 0.0, 360.0, white);

        assert_eq!(pixel(&frame, 64, 32 + 13, 32), (0xff, 0xff, 0xff));
        assert_eq!(pixel(&frame, 64, 32 - 13, 32), (0xff, 0xff, 0xff));
        assert_eq!(pixel(&frame, 64, 32, 32 + 13), (0xff, 0xff, 0xff));
    }

    #[test]
    fn circle_stroke_stays_on_the_rim() {
        let mut frame = vec![0u8; 64 * 64 * 4];
        let mut canvas = Canvas::new(&mut frame, 64, 64);
        let red = Color::new(0xff, 0, 0);
        stroke_circle_aa(&mut canvas, 32.0, 32.0, 12.0, red);

        assert_eq!(pixel(&frame, 64, 32 + 12, 32), (0xff, 0, 0));
        assert_eq!(pixel(&frame, 64, 32 + 6, 32), (0, 0, 0));
        assert_eq!(pixel(&frame, 64, 32 + 20, 32), (0, 0, 0));
    }

    #[test]
    fn encoder_renders_default_disc_without_spurious_overlay() {
        let config = EncoderConfig::builder().build();
        let mut encoder = Encoder::new(config);
        let mut scene = Scene::new();
        encoder.render(&mut scene);

        // n = 2 merges to one arc per track, no instrumentation.
        assert_eq!(scene.commands.len(), 2);
        assert!(scene
            .commands
            .iter()
            .all(|command| matches!(command, DrawCommand::ArcSegment { .. })));
    }

    #[test]
    fn encoder_regenerates_sequence_on_bit_count_change() {
        let config = EncoderConfig::builder().bit_count(2).build();
        let mut encoder = Encoder::new(config);
        assert_eq!(encoder.sequence(), &[0, 1, 3, 2]);

        encoder.set_bit_count(3);
        assert_eq!(encoder.sequence(), &[0, 1, 3, 2, 6, 7, 5, 4]);

        // Radius changes keep the cached sequence.
        encoder.set_outer_radius(400.0);
        assert_eq!(encoder.sequence().len(), 8);
    }

    #[test]
    fn encoder_applies_channel_commands() {
        let mut encoder = Encoder::new(EncoderConfig::builder().build());
        encoder.apply_command(EncoderCommand::SetBitCount(4));
        encoder.apply_command(EncoderCommand::SetOuterRadius(90.0));
        encoder.apply_command(EncoderCommand::SetInvertTracks(true));
        encoder.apply_command(EncoderCommand::SetInstrumentation(true));

        assert_eq!(encoder.ring().bit_count(), 4);
        assert_eq!(encoder.ring().outer_radius(), 101.0);
        assert!(encoder.ring().invert_tracks());
        assert!(encoder.ring().instrumentation());
    }
}
