use palette::Srgb;
use thiserror::Error;

/// Ordered segment fill colors, cycled by index. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<Srgb<u8>>);

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Palette must contain at least one color")]
    Empty,
    #[error("Invalid color {0:?}: {1}")]
    InvalidColor(String, palette::rgb::FromHexError),
}

impl Palette {
    pub fn new(colors: Vec<Srgb<u8>>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self(colors))
    }

    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, PaletteError> {
        let colors = hex
            .iter()
            .map(|raw| {
                raw.as_ref()
                    .parse()
                    .map_err(|e| PaletteError::InvalidColor(raw.as_ref().to_string(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        // constructors reject empty palettes
        false
    }

    pub fn color(&self, index: usize) -> Srgb<u8> {
        self.0[index % self.0.len()]
    }

    /// Label fill for the segment at `index`: black on the two light fills
    /// the host ships, white on everything else. A fixed rule, not a
    /// luminance computation.
    pub fn label_color(&self, index: usize) -> Srgb<u8> {
        if has_dark_label(self.color(index)) {
            Srgb::new(0x00, 0x00, 0x00)
        } else {
            Srgb::new(0xff, 0xff, 0xff)
        }
    }
}

// #efb71d and #24a643
fn has_dark_label(fill: Srgb<u8>) -> bool {
    matches!(
        (fill.red, fill.green, fill.blue),
        (0xef, 0xb7, 0x1d) | (0x24, 0xa6, 0x43)
    )
}
