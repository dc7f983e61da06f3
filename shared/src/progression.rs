//! Experience curve shared by the player board and the API.
//!
//! A [`LevelCurve`] prices each level; [`LevelCurve::progress`] walks the
//! curve to find where an experience total lands.

use serde::{Deserialize, Serialize};

/// Levels beyond this are not computed.
pub const MAX_LEVEL: u32 = 1000;

// Tolerance for float sums like 100 + 105.00000000000001.
const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LevelCurve {
    /// `cost(level) = base * growth^(level - 1)`
    Geometric { base: f64, growth: f64 },
    /// Every level costs `step`.
    Linear { step: f64 },
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::Geometric {
            base: 100.0,
            growth: 1.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: u32,
    /// Experience consumed by levels `1..level`.
    pub exp_before_level: f64,
    /// Experience accumulated inside the current level.
    pub exp_into_level: f64,
    /// Cost of the current level.
    pub exp_for_next: f64,
    /// `exp_into_level / exp_for_next` as a percentage in `0..=100`.
    pub percent: f64,
}

impl LevelCurve {
    /// Experience needed to go from `level` to `level + 1`.
    pub fn cost(&self, level: u32) -> f64 {
        let level = level.max(1);
        match *self {
            Self::Geometric { base, growth } => base * growth.powi(level as i32 - 1),
            Self::Linear { step } => step,
        }
    }

    /// Total cost of levels `1..level`.
    pub fn cumulative(&self, level: u32) -> f64 {
        (1..level.clamp(1, MAX_LEVEL)).map(|l| self.cost(l)).sum()
    }

    /// Derives the level from an experience total.
    pub fn progress(&self, exp: f64) -> LevelProgress {
        let exp = sanitize_exp(exp);
        let mut level = 1;
        let mut before = 0.0;

        while level < MAX_LEVEL {
            let cost = self.cost(level);
            if !cost.is_finite() || cost <= 0.0 || before + cost > exp + EPSILON {
                break;
            }
            before += cost;
            level += 1;
        }

        self.finish(level, before, (exp - before).max(0.0))
    }

    /// Progress of `exp` inside an already known `level`.
    ///
    /// Mirrors the board's view of stored sheets: when the remainder already
    /// covers the level's cost the bar starts over at zero.
    pub fn progress_at_level(&self, level: i64, exp: f64) -> LevelProgress {
        let level = level.clamp(1, MAX_LEVEL as i64) as u32;
        let exp = sanitize_exp(exp);
        let before = self.cumulative(level);
        let mut into = (exp - before).max(0.0);
        if into + EPSILON >= self.cost(level) {
            into = 0.0;
        }
        self.finish(level, before, into)
    }

    fn finish(&self, level: u32, before: f64, into: f64) -> LevelProgress {
        let required = self.cost(level);
        let into = if into < EPSILON { 0.0 } else { into };
        let percent = if required > 0.0 {
            (into / required * 100.0).min(100.0)
        } else {
            0.0
        };
        LevelProgress {
            level,
            exp_before_level: before,
            exp_into_level: into,
            exp_for_next: required,
            percent,
        }
    }
}

fn sanitize_exp(exp: f64) -> f64 {
    if exp.is_finite() && exp > 0.0 { exp } else { 0.0 }
}
