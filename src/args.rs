//! Forgiving parsers for command-line values: a malformed value is logged and replaced by its
//! default instead of aborting the run.

use std::{fmt::Display, str::FromStr};

use crate::{
    foundation::core::MaskRegion,
    matte::fringe::{DEFAULT_FRINGE_PASSES, FringePass, parse_fringe_passes},
};

/// Parse `raw` as a `T`, or warn and return `default`. A missing value is not a warning.
pub fn lenient_number<T>(raw: Option<&str>, default: T, what: &str) -> T
where
    T: FromStr + Display + Copy,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(value = raw, default = %default, "invalid {what}; using default");
            default
        }
    }
}

/// Parse an `x1,y1,x2,y2` mask, or warn and run without one.
pub fn lenient_mask(raw: Option<&str>) -> Option<MaskRegion> {
    let raw = raw?;
    match raw.parse::<MaskRegion>() {
        Ok(mask) => Some(mask),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "ignoring mask");
            None
        }
    }
}

/// Parse a `white:radius,...` pass list, or warn and use the default passes.
pub fn lenient_fringe(raw: Option<&str>) -> Vec<FringePass> {
    let Some(raw) = raw else {
        return DEFAULT_FRINGE_PASSES.to_vec();
    };
    match parse_fringe_passes(raw) {
        Ok(passes) => passes,
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "invalid fringe passes; using defaults");
            DEFAULT_FRINGE_PASSES.to_vec()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/args.rs"]
mod tests;
