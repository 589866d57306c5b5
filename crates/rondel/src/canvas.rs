use crate::detail::DetailPolicy;
use crate::image::CenterImageCache;
use crate::state::{DeviceProfile, RenderState};
use crate::view;
use cairo::{Context, Format, ImageSurface};
use std::path::Path;

/// The renderer's drawable surface: an offscreen buffer at display size
/// times the effective pixel ratio, redrawn per frame and blitted to the
/// widget. Owning the buffer keeps frame skipping cheap (re-blit) and the
/// pixel-ratio cap for huge wheels local to this type.
#[derive(Debug)]
pub struct WheelCanvas {
    surface: Option<ImageSurface>,
    buffer_size: (i32, i32),
    dpr: f64,
    images: CenterImageCache,
}

impl WheelCanvas {
    pub fn new() -> Self {
        Self {
            surface: None,
            buffer_size: (0, 0),
            dpr: 1.0,
            images: CenterImageCache::new(),
        }
    }

    /// Re-keys the center image cache. True when a newly decoded image is
    /// ready and the host should schedule a settle redraw.
    pub fn sync_center_image(&mut self, reference: Option<&Path>) -> bool {
        self.images.sync(reference)
    }

    /// Renders one frame into the offscreen buffer. Never propagates: a
    /// failed frame is logged and dropped so the next one can still land.
    pub fn render(
        &mut self,
        state: &RenderState,
        profile: &DeviceProfile,
        display_width: f64,
        display_height: f64,
    ) {
        if let Err(e) = self.try_render(state, profile, display_width, display_height) {
            log::error!("Drawing error: {}", e);
        }
    }

    fn try_render(
        &mut self,
        state: &RenderState,
        profile: &DeviceProfile,
        display_width: f64,
        display_height: f64,
    ) -> Result<(), cairo::Error> {
        // a zero-sized surface reports its configured dimensions instead
        let width = if display_width > 0.0 {
            display_width
        } else {
            state.viewport_width
        };
        let height = if display_height > 0.0 {
            display_height
        } else {
            state.viewport_height
        };

        let policy = DetailPolicy::for_segments(state.segments.len());
        let dpr = policy.effective_dpr(profile.device_pixel_ratio);
        self.ensure_buffer(width, height, dpr)?;
        let Some(surface) = self.surface.as_ref() else {
            return Ok(());
        };

        let cr = Context::new(surface)?;
        cr.scale(dpr, dpr);

        cr.save()?;
        cr.set_operator(cairo::Operator::Clear);
        cr.paint()?;
        cr.restore()?;

        view::draw(
            &cr,
            state,
            profile,
            &policy,
            self.images.pixbuf(),
            width,
            height,
        )?;
        surface.flush();
        Ok(())
    }

    /// Rebuilds the pixel buffer whenever the displayed size or the
    /// effective pixel ratio changes.
    fn ensure_buffer(&mut self, width: f64, height: f64, dpr: f64) -> Result<(), cairo::Error> {
        let device = (
            (width * dpr).round().max(1.0) as i32,
            (height * dpr).round().max(1.0) as i32,
        );
        if self.surface.is_none() || self.buffer_size != device || self.dpr != dpr {
            self.surface = Some(ImageSurface::create(Format::ARgb32, device.0, device.1)?);
            self.buffer_size = device;
            self.dpr = dpr;
        }
        Ok(())
    }

    /// Blits the last rendered frame onto the widget context. Also used for
    /// frames the throttle skipped, so the widget never goes blank.
    pub fn paint_onto(&self, cr: &Context) -> Result<(), cairo::Error> {
        let Some(surface) = self.surface.as_ref() else {
            return Ok(());
        };
        cr.save()?;
        cr.scale(1.0 / self.dpr, 1.0 / self.dpr);
        cr.set_source_surface(surface, 0.0, 0.0)?;
        cr.paint()?;
        cr.restore()
    }
}

impl Default for WheelCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;
    use crate::state::Segment;

    fn test_state(segment_count: usize, rotation: f64) -> RenderState {
        let segments = (0..segment_count)
            .map(|i| Segment::new(format!("Player {}", i + 1)))
            .collect();
        let palette = Palette::from_hex(&[
            "#e2231a", "#efb71d", "#24a643", "#1660a8", "#7b3fa0",
        ])
        .unwrap();
        let mut state = RenderState::new(segments, palette, 200.0, 200.0);
        state.rotation_degrees = rotation;
        state
    }

    fn snapshot(segment_count: usize, rotation: f64) -> Vec<u8> {
        let state = test_state(segment_count, rotation);
        let profile = DeviceProfile::new(1.0, 200.0);
        let mut canvas = WheelCanvas::new();
        canvas.render(&state, &profile, 200.0, 200.0);

        let mut surface = canvas.surface.take().expect("buffer allocated");
        surface.flush();
        let data = surface.data().expect("sole owner of the buffer");
        data.to_vec()
    }

    #[test]
    fn test_rotation_invariant_modulo_full_turns() {
        assert_eq!(snapshot(12, 37.5), snapshot(12, 37.5 + 720.0));
        assert_eq!(snapshot(12, -90.0), snapshot(12, 270.0));
    }

    #[test]
    fn test_rotation_actually_rotates() {
        // 12 slices over a 5-color palette: a quarter turn shifts the fill
        // pattern, so the buffers must differ
        assert_ne!(snapshot(12, 0.0), snapshot(12, 90.0));
    }

    #[test]
    fn test_degenerate_wheel_renders_hub_only() {
        let state = test_state(0, 0.0);
        let profile = DeviceProfile::new(1.0, 200.0);
        let mut canvas = WheelCanvas::new();
        canvas.render(&state, &profile, 200.0, 200.0);
        assert!(canvas.surface.is_some());
    }

    #[test]
    fn test_single_segment_full_circle() {
        let state = test_state(1, 45.0);
        let profile = DeviceProfile::new(1.0, 200.0);
        let mut canvas = WheelCanvas::new();
        canvas.render(&state, &profile, 200.0, 200.0);
        assert_eq!(canvas.buffer_size, (200, 200));
    }

    #[test]
    fn test_zero_display_size_falls_back_to_configured() {
        let state = test_state(4, 0.0);
        let profile = DeviceProfile::new(1.0, 200.0);
        let mut canvas = WheelCanvas::new();
        canvas.render(&state, &profile, 0.0, 0.0);
        assert_eq!(canvas.buffer_size, (200, 200));
    }

    #[test]
    fn test_dense_wheel_caps_pixel_ratio() {
        let state = test_state(2500, 0.0);
        let profile = DeviceProfile::new(2.0, 200.0);
        let mut canvas = WheelCanvas::new();
        canvas.render(&state, &profile, 200.0, 200.0);
        assert_eq!(canvas.dpr, 1.5);
        assert_eq!(canvas.buffer_size, (300, 300));
    }

    #[test]
    fn test_buffer_rebuilt_on_resize_only() {
        let state = test_state(6, 0.0);
        let profile = DeviceProfile::new(1.0, 200.0);
        let mut canvas = WheelCanvas::new();

        canvas.render(&state, &profile, 200.0, 200.0);
        let first = canvas.surface.clone().expect("buffer allocated");

        canvas.render(&state, &profile, 200.0, 200.0);
        let second = canvas.surface.clone().expect("buffer allocated");
        assert_eq!(first.to_raw_none(), second.to_raw_none());

        canvas.render(&state, &profile, 300.0, 200.0);
        assert_eq!(canvas.buffer_size, (300, 200));
    }
}
