#![allow(dead_code)]

use annoverify::decode::center::CenterRow;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Tolerance, in pixels, for decode-then-encode comparisons.
pub const EPS_PIXELS: f64 = 1.0 + 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_image_dims() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=4096, 1u32..=4096)
}

/// A label row whose box lies inside the unit square.
pub fn arb_center_row(max_class: usize) -> impl Strategy<Value = CenterRow> {
    (0..max_class, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(class_index, a, b, c, d)| {
            let (xmin, xmax) = if a <= c { (a, c) } else { (c, a) };
            let (ymin, ymax) = if b <= d { (b, d) } else { (d, b) };
            CenterRow {
                class_index,
                cx: (xmin + xmax) / 2.0,
                cy: (ymin + ymax) / 2.0,
                w: xmax - xmin,
                h: ymax - ymin,
            }
        },
    )
}

pub fn format_row(row: &CenterRow) -> String {
    format!(
        "{} {} {} {} {}",
        row.class_index, row.cx, row.cy, row.w, row.h
    )
}
