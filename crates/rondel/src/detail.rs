use std::borrow::Cow;
use std::time::Duration;

const MAX_LABEL_CHARS: usize = 10;

/// Rendering quality, stepped down as the segment count grows. Per-frame
/// cost scales with the number of slices, so fidelity is traded for frame
/// rate at fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailPolicy {
    segments: usize,
}

impl DetailPolicy {
    pub fn for_segments(segments: usize) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn drop_shadow(&self) -> bool {
        self.segments < 2000
    }

    pub fn shine_gradient(&self) -> bool {
        self.segments < 300
    }

    pub fn segment_strokes(&self) -> bool {
        self.segments < 500
    }

    pub fn labels(&self) -> bool {
        self.segments < 500
    }

    /// Minimum slice width (radians) for a label to be drawn at all.
    pub fn min_label_angle(&self) -> f64 {
        if self.segments > 500 { 0.01 } else { 0.001 }
    }

    pub fn image_smoothing(&self) -> bool {
        self.segments <= 5000
    }

    /// Pixel-density cap: very large wheels render at a reduced resolution.
    pub fn effective_dpr(&self, base: f64) -> f64 {
        if self.segments > 2000 {
            base.min(1.5)
        } else {
            base
        }
    }

    /// How long observed resizes settle before the buffer is rebuilt.
    pub fn resize_debounce(&self) -> Duration {
        let millis = if self.segments > 5000 {
            100
        } else if self.segments > 2000 {
            50
        } else {
            0
        };
        Duration::from_millis(millis)
    }

    /// Minimum spacing between actual draws: uncapped, ~120fps, ~60fps.
    pub fn min_draw_interval(&self) -> Duration {
        let millis = if self.segments > 2000 {
            16
        } else if self.segments > 1000 {
            8
        } else {
            0
        };
        Duration::from_millis(millis)
    }

    /// Label text as rendered: dense wheels truncate long labels.
    pub fn display_label<'a>(&self, label: &'a str) -> Cow<'a, str> {
        if self.segments > 500 && label.chars().count() > MAX_LABEL_CHARS {
            let head: String = label.chars().take(MAX_LABEL_CHARS).collect();
            Cow::Owned(format!("{}...", head))
        } else {
            Cow::Borrowed(label)
        }
    }
}
