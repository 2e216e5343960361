//! Palette lookup-by-name service
//!
//! Holds named palettes and resolves the name recorded in a map's palette
//! settings. Ships the handful of ramps connectivity data is usually
//! viewed with; callers can register their own.

use hashbrown::HashMap;

use dconn_core::palette::{Palette, PaletteSource, ScalarColor};

#[derive(Debug, Default)]
pub struct PaletteBank {
    palettes: HashMap<String, Palette>,
}

impl PaletteBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank preloaded with the builtin palettes.
    pub fn with_builtin_palettes() -> Self {
        let mut bank = Self::new();
        bank.add(roy_big_bl());
        bank.add(psych());
        bank.add(Palette::neutral_gray());
        bank
    }

    pub fn add(&mut self, palette: Palette) {
        self.palettes.insert(palette.name().to_string(), palette);
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }
}

impl PaletteSource for PaletteBank {
    fn palette_by_name(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }
}

fn point(scalar: f32, r: f32, g: f32, b: f32) -> ScalarColor {
    ScalarColor {
        scalar,
        color: [r, g, b, 1.0],
    }
}

/// The classic connectivity ramp: yellow through red for positive values,
/// black at zero, blue through cyan for negative values.
fn roy_big_bl() -> Palette {
    Palette::new(
        "ROY-BIG-BL",
        vec![
            point(1.0, 1.0, 1.0, 0.0),
            point(0.75, 1.0, 0.62, 0.0),
            point(0.5, 1.0, 0.2, 0.0),
            point(0.25, 0.75, 0.0, 0.0),
            point(0.0, 0.0, 0.0, 0.0),
            point(-0.25, 0.0, 0.0, 0.56),
            point(-0.5, 0.0, 0.3, 1.0),
            point(-0.75, 0.0, 0.6, 1.0),
            point(-1.0, 0.0, 1.0, 1.0),
        ],
    )
}

fn psych() -> Palette {
    Palette::new(
        "PSYCH",
        vec![
            point(1.0, 1.0, 1.0, 0.0),
            point(0.5, 1.0, 0.5, 0.0),
            point(0.05, 1.0, 0.0, 0.0),
            ScalarColor {
                scalar: 0.0,
                color: [0.0, 0.0, 0.0, 0.0],
            },
            point(-0.05, 0.0, 1.0, 0.0),
            point(-0.5, 0.0, 0.5, 1.0),
            point(-1.0, 0.0, 0.0, 1.0),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let bank = PaletteBank::with_builtin_palettes();
        assert!(bank.palette_by_name("ROY-BIG-BL").is_some());
        assert!(bank.palette_by_name("Gray_Interp").is_some());
        assert!(bank.palette_by_name("no-such-palette").is_none());
    }

    #[test]
    fn registered_palettes_resolve() {
        let mut bank = PaletteBank::new();
        bank.add(Palette::new("custom", Vec::new()));
        assert!(bank.palette_by_name("custom").is_some());
        assert_eq!(bank.len(), 1);
    }
}
