//! Box colors.
//!
//! Two policies are supported and both are kept as selectable modes:
//! seeded per-class colors (each class gets a random but reproducible color)
//! and one fixed color for every box.

use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::ClassCatalog;
use crate::decode::ClassRef;

/// Seed used for per-class colors unless overridden.
pub const DEFAULT_COLOR_SEED: u64 = 42;

/// Pure green, the fixed-mode box color.
pub const FIXED_BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// How box colors are chosen for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// One random color per catalog entry, drawn from a PRNG seeded with `seed`.
    Seeded { seed: u64 },
    /// The same color for every box.
    Fixed(Rgb<u8>),
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Seeded {
            seed: DEFAULT_COLOR_SEED,
        }
    }
}

/// Colors resolved once before the per-image loop; read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorTable {
    Fixed(Rgb<u8>),
    PerClass {
        colors: Vec<Rgb<u8>>,
        catalog: ClassCatalog,
        fallback: Rgb<u8>,
    },
}

impl ColorTable {
    /// Build the table for a run.
    ///
    /// Seeded mode needs a catalog to know how many colors to draw; callers
    /// are expected to have checked that one is available.
    pub fn build(mode: ColorMode, catalog: Option<&ClassCatalog>) -> Self {
        match (mode, catalog) {
            (ColorMode::Seeded { seed }, Some(catalog)) => {
                let mut rng = StdRng::seed_from_u64(seed);
                ColorTable::PerClass {
                    colors: seeded_colors(&mut rng, catalog.len()),
                    catalog: catalog.clone(),
                    fallback: FIXED_BOX_COLOR,
                }
            }
            (ColorMode::Seeded { .. }, None) => ColorTable::Fixed(FIXED_BOX_COLOR),
            (ColorMode::Fixed(color), _) => ColorTable::Fixed(color),
        }
    }

    /// Color for a decoded box.
    ///
    /// Classes known only by name are looked up in the catalog; names the
    /// catalog does not know get the fallback color.
    pub fn color_for(&self, class: &ClassRef) -> Rgb<u8> {
        match self {
            ColorTable::Fixed(color) => *color,
            ColorTable::PerClass {
                colors,
                catalog,
                fallback,
            } => {
                let index = match class {
                    ClassRef::Index { index, .. } => Some(*index),
                    ClassRef::Name(name) => catalog.index_of(name),
                };
                index
                    .and_then(|index| colors.get(index))
                    .copied()
                    .unwrap_or(*fallback)
            }
        }
    }
}

fn seeded_colors<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Rgb<u8>> {
    (0..count)
        .map(|_| {
            Rgb([
                rng.random_range(0..=255u8),
                rng.random_range(0..=255u8),
                rng.random_range(0..=255u8),
            ])
        })
        .collect()
}
