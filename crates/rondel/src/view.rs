use crate::detail::DetailPolicy;
use crate::geometry::{self, SegmentArc};
use crate::palette::Palette;
use crate::state::{DeviceProfile, RenderState};
use crate::TEXT_EDGE_INSET;
use cairo::{Context, RadialGradient};
use gdk4::prelude::*;
use gdk_pixbuf::Pixbuf;
use palette::Srgb;
use std::f64::consts::PI;

const STROKE_WIDTH: f64 = 1.0;
const STROKE_ALPHA: f64 = 0.1;
const SHADOW_ALPHA: f64 = 0.3;
const SHADOW_OFFSET_Y: f64 = 10.0;
const SHADOW_SPREAD: f64 = 15.0;
const TEXT_SHADOW_ALPHA: f64 = 0.2;
const TEXT_SHADOW_OFFSET: f64 = 1.0;
const HUB_SHADOW_ALPHA: f64 = 0.2;
const HUB_SHADOW_SPREAD: f64 = 5.0;

struct SegmentRenderer<'a> {
    index: usize,
    arc: SegmentArc,
    label: &'a str,
    radius: f64,
    palette: &'a Palette,
    policy: &'a DetailPolicy,
    profile: &'a DeviceProfile,
}

impl SegmentRenderer<'_> {
    fn draw(&self, cr: &Context) -> Result<(), cairo::Error> {
        self.fill_sector(cr)?;
        if self.policy.shine_gradient() {
            self.draw_shine(cr)?;
        }
        if self.policy.segment_strokes() {
            self.draw_stroke(cr)?;
        }
        if self.policy.labels() && self.arc.width() >= self.policy.min_label_angle() {
            self.draw_label(cr)?;
        }
        Ok(())
    }

    fn sector_path(&self, cr: &Context) {
        cr.new_path();
        cr.move_to(0.0, 0.0);
        cr.arc(0.0, 0.0, self.radius, self.arc.start, self.arc.end);
        cr.close_path();
    }

    fn fill_sector(&self, cr: &Context) -> Result<(), cairo::Error> {
        self.sector_path(cr);
        set_source_color(cr, self.palette.color(self.index));
        cr.fill()
    }

    // radial shine: light core fading into a darkened rim
    fn draw_shine(&self, cr: &Context) -> Result<(), cairo::Error> {
        let gradient = RadialGradient::new(0.0, 0.0, 0.0, 0.0, 0.0, self.radius);
        gradient.add_color_stop_rgba(0.0, 1.0, 1.0, 1.0, 0.1);
        gradient.add_color_stop_rgba(0.6, 1.0, 1.0, 1.0, 0.0);
        gradient.add_color_stop_rgba(1.0, 0.0, 0.0, 0.0, 0.1);
        self.sector_path(cr);
        cr.set_source(&gradient)?;
        cr.fill()
    }

    fn draw_stroke(&self, cr: &Context) -> Result<(), cairo::Error> {
        self.sector_path(cr);
        cr.set_line_width(STROKE_WIDTH);
        cr.set_source_rgba(0.0, 0.0, 0.0, STROKE_ALPHA);
        cr.stroke()
    }

    /// Label along the slice's mid-angle ray, right-aligned near the rim.
    fn draw_label(&self, cr: &Context) -> Result<(), cairo::Error> {
        let text = self.policy.display_label(self.label);
        if text.is_empty() {
            return Ok(());
        }

        cr.save()?;
        cr.rotate(self.arc.mid());

        let size = geometry::label_font_size(self.radius, self.arc.width(), self.profile);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        cr.set_font_size(size);

        let ext = cr.text_extents(&text)?;
        let x = self.radius - TEXT_EDGE_INSET - ext.width();
        let y = ext.height() / 2.0;

        cr.set_source_rgba(0.0, 0.0, 0.0, TEXT_SHADOW_ALPHA);
        cr.move_to(x + TEXT_SHADOW_OFFSET, y + TEXT_SHADOW_OFFSET);
        cr.show_text(&text)?;

        set_source_color(cr, self.palette.label_color(self.index));
        cr.move_to(x, y);
        cr.show_text(&text)?;

        cr.restore()
    }
}

/// Draws one complete frame in logical units. Errors bubble to the caller,
/// which logs and drops the frame; nothing here may panic on user input.
pub fn draw(
    cr: &Context,
    state: &RenderState,
    profile: &DeviceProfile,
    policy: &DetailPolicy,
    center_image: Option<&Pixbuf>,
    width: f64,
    height: f64,
) -> Result<(), cairo::Error> {
    let (center_x, center_y, radius) = geometry::wheel_frame(width, height);

    cr.save()?;
    cr.translate(center_x, center_y);
    cr.rotate(geometry::rotation_radians(state.rotation_degrees));

    if policy.drop_shadow() {
        draw_wheel_shadow(cr, radius)?;
    }

    let count = state.segments.len();
    for (index, segment) in state.segments.iter().enumerate() {
        SegmentRenderer {
            index,
            arc: geometry::segment_arc(index, count),
            label: &segment.label,
            radius,
            palette: &state.palette,
            policy,
            profile,
        }
        .draw(cr)?;
    }

    draw_hub(cr, state, profile, policy, center_image)?;
    cr.restore()
}

// soft radial falloff in place of a blur
fn draw_wheel_shadow(cr: &Context, radius: f64) -> Result<(), cairo::Error> {
    let gradient = RadialGradient::new(
        0.0,
        SHADOW_OFFSET_Y,
        radius - SHADOW_SPREAD,
        0.0,
        SHADOW_OFFSET_Y,
        radius + SHADOW_SPREAD,
    );
    gradient.add_color_stop_rgba(0.0, 0.0, 0.0, 0.0, SHADOW_ALPHA);
    gradient.add_color_stop_rgba(1.0, 0.0, 0.0, 0.0, 0.0);
    cr.arc(0.0, SHADOW_OFFSET_Y, radius + SHADOW_SPREAD, 0.0, 2.0 * PI);
    cr.set_source(&gradient)?;
    cr.fill()
}

/// Hub disc atop the segments, inside the rotation transform so a clipped
/// center image spins with the wheel.
fn draw_hub(
    cr: &Context,
    state: &RenderState,
    profile: &DeviceProfile,
    policy: &DetailPolicy,
    center_image: Option<&Pixbuf>,
) -> Result<(), cairo::Error> {
    let hub_radius = profile.hub_radius();

    let gradient = RadialGradient::new(
        0.0,
        0.0,
        hub_radius,
        0.0,
        0.0,
        hub_radius + HUB_SHADOW_SPREAD,
    );
    gradient.add_color_stop_rgba(0.0, 0.0, 0.0, 0.0, HUB_SHADOW_ALPHA);
    gradient.add_color_stop_rgba(1.0, 0.0, 0.0, 0.0, 0.0);
    cr.arc(0.0, 0.0, hub_radius + HUB_SHADOW_SPREAD, 0.0, 2.0 * PI);
    cr.set_source(&gradient)?;
    cr.fill()?;

    cr.arc(0.0, 0.0, hub_radius, 0.0, 2.0 * PI);
    cr.set_source_rgb(1.0, 1.0, 1.0);
    cr.fill()?;

    if let Some(pixbuf) = center_image {
        let image_radius = hub_radius * state.center_image_size.hub_factor();
        draw_center_image(cr, pixbuf, image_radius, policy)?;
    }
    Ok(())
}

fn draw_center_image(
    cr: &Context,
    pixbuf: &Pixbuf,
    image_radius: f64,
    policy: &DetailPolicy,
) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.arc(0.0, 0.0, image_radius, 0.0, 2.0 * PI);
    cr.clip();

    let (image_width, image_height) = (f64::from(pixbuf.width()), f64::from(pixbuf.height()));
    cr.translate(-image_radius, -image_radius);
    cr.scale(
        image_radius * 2.0 / image_width,
        image_radius * 2.0 / image_height,
    );
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    if !policy.image_smoothing() {
        cr.source().set_filter(cairo::Filter::Nearest);
    }
    cr.paint()?;
    cr.restore()
}

fn set_source_color(cr: &Context, color: Srgb<u8>) {
    let (r, g, b) = color.into_format::<f64>().into_components();
    cr.set_source_rgb(r, g, b);
}
