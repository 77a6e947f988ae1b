//! Scoring context derived once from validated [`ScoringParams`].

use crate::params::{Bandwidth, Model, ScoringParams};

#[derive(Debug, Clone, Copy)]
pub struct ScoreContext {
    pub model: Model,
    pub bw: usize,
    pub match_score: i64,
    pub mismatch_score: i64,
    pub gap_open: i64,
    pub gap_extend: i64,
    pub x_drop: i64,
    pub filter_len: usize,
}

pub const NEG_INF: i64 = i64::MIN / 4;

impl ScoreContext {
    pub fn new(params: &ScoringParams) -> Self {
        ScoreContext {
            model: params.model,
            bw: match params.bandwidth {
                Bandwidth::Bw16 => 16,
                Bandwidth::Bw32 => 32,
            },
            match_score: params.match_reward as i64,
            mismatch_score: -(params.mismatch_penalty as i64),
            gap_open: params.gap_open as i64,
            gap_extend: params.gap_extend as i64,
            x_drop: params.x_drop as i64,
            filter_len: params.filter_len,
        }
    }

    /// Diagonal transition score: a 4-bit-AND match test, nonzero means
    /// the two IUPAC codes share a base.
    #[inline]
    pub fn diag_score(&self, a: u8, b: u8) -> i64 {
        if a & b != 0 {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    /// Per-base cost charged for a single gap step under the linear model.
    #[inline]
    pub fn linear_gap_cost(&self) -> i64 {
        self.gap_open + self.gap_extend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Bandwidth, Model, ScoringParams};

    #[test]
    fn diag_score_distinguishes_match_and_mismatch() {
        let params = ScoringParams {
            model: Model::Linear,
            bandwidth: Bandwidth::Bw32,
            match_reward: 1,
            mismatch_penalty: 1,
            gap_open: 0,
            gap_extend: 1,
            x_drop: 30,
            filter_len: 5,
        };
        let ctx = ScoreContext::new(&params);
        assert_eq!(ctx.diag_score(1, 1), 1);
        assert_eq!(ctx.diag_score(1, 2), -1);
    }
}
