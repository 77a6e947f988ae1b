//! Maximum locator.
//!
//! The original recovers the best cell with a backward scan over the
//! block journal, intersecting per-block tie-masks until only one lane
//! survives. This crate tracks the running best cell directly on
//! [`crate::tail::ResumeState`] as fill proceeds, so locating it is a
//! lookup rather than a scan; see `DESIGN.md`.

use crate::fill::DpContext;
use crate::tail::TailId;

#[derive(Debug, Clone, Copy)]
pub struct MaxLocation {
    pub tail: TailId,
    pub row: i64,
    pub col: i64,
    pub score: i64,
}

pub fn search_max(dp: &DpContext, from: TailId) -> MaxLocation {
    let tail = dp.tails.get(from);
    let best_tail = tail.resume.best_tail.unwrap_or(from);
    MaxLocation {
        tail: best_tail,
        row: tail.resume.best_row,
        col: tail.resume.best_col,
        score: tail.resume.best_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Bandwidth, Model, ScoringParams};
    use crate::score::ScoreContext;
    use crate::seq::{Section, Strand};

    #[test]
    fn finds_full_length_match_endpoint() {
        let params = ScoringParams {
            model: Model::Linear,
            bandwidth: Bandwidth::Bw16,
            match_reward: 1,
            mismatch_penalty: 1,
            gap_open: 0,
            gap_extend: 1,
            x_drop: 30,
            filter_len: 3,
        };
        let mut dp = DpContext::new(ScoreContext::new(&params));
        let data = [1u8, 2, 4, 8, 1, 2];
        let a = Section::new(0, &data, 0, 6, Strand::Forward);
        let b = Section::new(1, &data, 0, 6, Strand::Forward);
        let t = dp.fill_root(&a, &b).unwrap();
        let loc = search_max(&dp, t);
        assert_eq!(loc.score, 6);
        assert_eq!(loc.row, 6);
        assert_eq!(loc.col, 6);
    }
}
