use crate::error::{PlotError, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// X axis scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "Option<u32>")]
pub enum ScaleBase {
    Linear,
    #[default]
    Log2,
    Log10,
}

impl ScaleBase {
    /// Logarithm base, `None` for a linear axis
    pub fn radix(&self) -> Option<f64> {
        match self {
            ScaleBase::Linear => None,
            ScaleBase::Log2 => Some(2.0),
            ScaleBase::Log10 => Some(10.0),
        }
    }
}

impl TryFrom<Option<u32>> for ScaleBase {
    type Error = String;

    fn try_from(base: Option<u32>) -> std::result::Result<Self, Self::Error> {
        match base {
            None => Ok(ScaleBase::Linear),
            Some(2) => Ok(ScaleBase::Log2),
            Some(10) => Ok(ScaleBase::Log10),
            Some(other) => Err(format!("unsupported log base {}", other)),
        }
    }
}

impl FromStr for ScaleBase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "linear" | "none" => Ok(ScaleBase::Linear),
            "2" | "log2" => Ok(ScaleBase::Log2),
            "10" | "log10" => Ok(ScaleBase::Log10),
            other => Err(format!(
                "unsupported scale '{}' (expected linear, 2 or 10)",
                other
            )),
        }
    }
}

impl fmt::Display for ScaleBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleBase::Linear => f.write_str("linear"),
            ScaleBase::Log2 => f.write_str("log2"),
            ScaleBase::Log10 => f.write_str("log10"),
        }
    }
}

/// Scale, explicit ticks and plotted range for the x axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlan {
    pub scale: ScaleBase,
    /// Empty for linear axes: the renderer picks its own ticks
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub range: (f64, f64),
}

/// Decimal tick label, never in exponent form
pub fn format_tick(value: f64) -> String {
    format!("{}", value)
}

/// Plan the x axis for a set of input sizes.
///
/// On log scales the ticks are every power of the base from the one at
/// or below the smallest size to the one at or above the largest.
/// Non-positive and subnormal sizes cannot sit on a log axis and are
/// ignored there. Powers that overflow or underflow `f64` are dropped, in
/// which case the range still extends to the outermost size.
pub fn plan(input_sizes: &[f64], scale: ScaleBase) -> Result<AxisPlan> {
    let usable: Vec<f64> = input_sizes
        .iter()
        .copied()
        .filter(|x| match scale {
            ScaleBase::Linear => x.is_finite(),
            ScaleBase::Log2 | ScaleBase::Log10 => x.is_normal() && *x > 0.0,
        })
        .collect();

    let min = usable.iter().copied().reduce(f64::min).ok_or(PlotError::EmptyDomain)?;
    let max = usable.iter().copied().reduce(f64::max).ok_or(PlotError::EmptyDomain)?;

    let plan = match scale.radix() {
        None => {
            let range = if min == max {
                (min - 1.0, max + 1.0)
            } else {
                (min, max)
            };
            AxisPlan {
                scale,
                tick_positions: Vec::new(),
                tick_labels: Vec::new(),
                range,
            }
        }
        Some(base) => {
            let lo = exponent(min, base, f64::floor);
            let hi = exponent(max, base, f64::ceil);
            let ticks: Vec<f64> = (lo..=hi)
                .map(|e| base.powi(e))
                .filter(|t| t.is_normal())
                .collect();
            let (first, last) = match (ticks.first(), ticks.last()) {
                (Some(&first), Some(&last)) => (first, last),
                _ => return Err(PlotError::EmptyDomain),
            };
            let range = (first.min(min), last.max(max));

            AxisPlan {
                scale,
                tick_labels: ticks.iter().map(|&t| format_tick(t)).collect(),
                tick_positions: ticks,
                range,
            }
        }
    };

    debug!(
        scale = %plan.scale,
        ticks = plan.tick_positions.len(),
        lo = plan.range.0,
        hi = plan.range.1,
        "planned axis"
    );
    Ok(plan)
}

/// Exponent of `value` in `base`, snapping near-integers so exact powers
/// are not pushed out by rounding error
fn exponent(value: f64, base: f64, round: fn(f64) -> f64) -> i32 {
    let log = if base == 2.0 {
        value.log2()
    } else if base == 10.0 {
        value.log10()
    } else {
        value.log(base)
    };
    let nearest = log.round();
    if (log - nearest).abs() < 1e-9 {
        nearest as i32
    } else {
        round(log) as i32
    }
}
