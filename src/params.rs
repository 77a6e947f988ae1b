use serde::{Deserialize, Serialize};

use crate::error::{GabaError, Result};

/// Gap cost model. `Linear` charges `gap_open + gap_extend` on every gap
/// base; `Affine` charges `gap_open` once per gap and `gap_extend` per
/// extended base, tracked through separate deletion/insertion states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    Linear,
    Affine,
}

impl Model {
    fn name(self) -> &'static str {
        match self {
            Model::Linear => "linear",
            Model::Affine => "affine",
        }
    }
}

/// Width of the active antidiagonal band, in lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bandwidth {
    Bw16 = 16,
    Bw32 = 32,
}

impl Bandwidth {
    pub fn lanes(self) -> usize {
        self as usize
    }
}

/// Maximum lane count across either [`Bandwidth`] variant; fixed-capacity
/// buffers that need to outlive a bandwidth choice are sized to this.
pub const MAX_BW: usize = 32;

/// Number of antidiagonal steps journaled into a single [`crate::block::Block`].
pub const BLK: usize = 32;

/// Caller-supplied scoring parameters, validated once when an
/// [`crate::EngineContext`] is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringParams {
    pub model: Model,
    pub bandwidth: Bandwidth,
    pub match_reward: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    /// X-drop threshold: fill along a band terminates once the running
    /// maximum minus the current best lane score exceeds this value.
    pub x_drop: i32,
    /// Minimum run length of contiguous diagonal matches the ungapped
    /// filter requires before a root fill is allowed to proceed.
    pub filter_len: usize,
}

impl ScoringParams {
    pub fn validate(&self) -> Result<()> {
        if self.match_reward <= 0 {
            return Err(GabaError::InvalidScore {
                model: self.model.name(),
                reason: "match_reward must be positive".into(),
            });
        }
        if self.mismatch_penalty <= 0 {
            return Err(GabaError::InvalidScore {
                model: self.model.name(),
                reason: "mismatch_penalty must be positive".into(),
            });
        }
        let m = self.match_reward;
        let gi = self.gap_open;
        let ge = self.gap_extend;
        match self.model {
            Model::Linear => {
                if m - 2 * (ge + gi) > 255 {
                    return Err(GabaError::InvalidScore {
                        model: self.model.name(),
                        reason: format!(
                            "m - 2*(ge+gi) = {} exceeds the linear-model ceiling of 255",
                            m - 2 * (ge + gi)
                        ),
                    });
                }
                if gi + ge < 0 {
                    return Err(GabaError::InvalidScore {
                        model: self.model.name(),
                        reason: "gap_open + gap_extend must be >= 0 in the linear model".into(),
                    });
                }
            }
            Model::Affine => {
                if m - 2 * (ge + gi) > 31 {
                    return Err(GabaError::InvalidScore {
                        model: self.model.name(),
                        reason: format!(
                            "m - 2*(ge+gi) = {} exceeds the affine-model ceiling of 31",
                            m - 2 * (ge + gi)
                        ),
                    });
                }
                if ge > gi {
                    return Err(GabaError::InvalidScore {
                        model: self.model.name(),
                        reason: "gap_extend must be <= gap_open in the affine model".into(),
                    });
                }
                if gi + ge < -7 {
                    return Err(GabaError::InvalidScore {
                        model: self.model.name(),
                        reason: "gap_open + gap_extend must be >= -7 in the affine model".into(),
                    });
                }
            }
        }
        if self.filter_len == 0 {
            return Err(GabaError::InvalidScore {
                model: self.model.name(),
                reason: "filter_len must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(model: Model) -> ScoringParams {
        ScoringParams {
            model,
            bandwidth: Bandwidth::Bw32,
            match_reward: 1,
            mismatch_penalty: 1,
            gap_open: 0,
            gap_extend: 1,
            x_drop: 30,
            filter_len: 5,
        }
    }

    #[test]
    fn canonical_linear_params_validate() {
        assert!(base(Model::Linear).validate().is_ok());
    }

    #[test]
    fn canonical_affine_params_validate() {
        let mut p = base(Model::Affine);
        p.gap_open = 2;
        p.gap_extend = 1;
        assert!(p.validate().is_ok(), "gap_extend <= gap_open must be accepted");
        p.gap_extend = 3;
        assert!(p.validate().is_err(), "gap_extend > gap_open must be rejected");
    }

    #[test]
    fn affine_allows_negative_sum_down_to_the_floor() {
        let mut p = base(Model::Affine);
        p.gap_open = -3;
        p.gap_extend = -4;
        assert!(p.validate().is_ok(), "gap_open + gap_extend = -7 sits exactly on the floor");
        p.gap_extend = -5;
        assert!(p.validate().is_err(), "gap_open + gap_extend = -8 is past the floor");
    }

    #[test]
    fn linear_rejects_negative_sum() {
        let mut p = base(Model::Linear);
        p.gap_open = -1;
        p.gap_extend = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn negative_rewards_rejected() {
        let mut p = base(Model::Linear);
        p.match_reward = 0;
        assert!(p.validate().is_err());
    }
}
