//! A banded semi-global pairwise sequence aligner.
//!
//! Sequences are windows of 4-bit IUPAC-coded symbols. An [`EngineContext`]
//! holds validated scoring parameters; a [`fill::DpContext`] drives the
//! banded fill across a chain of section pairs; [`locate::search_max`] finds
//! the best cell reached so far; [`trace::trace`] walks the block journal
//! backward to recover an [`Alignment`].
//!
//! ```
//! use gaba_core::{EngineContext, ScoringParams, Model, Bandwidth, Section, Strand};
//!
//! let params = ScoringParams {
//!     model: Model::Linear,
//!     bandwidth: Bandwidth::Bw16,
//!     match_reward: 1,
//!     mismatch_penalty: 1,
//!     gap_open: 0,
//!     gap_extend: 1,
//!     x_drop: 30,
//!     filter_len: 3,
//! };
//! let engine = EngineContext::new(params).unwrap();
//! let mut dp = engine.new_dp_context();
//! let data = [1u8, 2, 4, 8, 1, 2, 4, 8];
//! let a = Section::new(0, &data, 0, 8, Strand::Forward);
//! let b = Section::new(1, &data, 0, 8, Strand::Forward);
//! let fill = dp.fill_root(&a, &b).unwrap();
//! let loc = gaba_core::locate::search_max(&dp, fill);
//! let alignment = gaba_core::trace_to_alignment(&dp, loc).unwrap();
//! assert_eq!(alignment.score, 8);
//! let len = alignment.path.len();
//! assert_eq!(gaba_core::dump_cigar_forward(&alignment.path, 0, len), "8M");
//! ```

pub mod arena;
pub mod block;
pub mod cigar;
pub mod error;
pub mod fill;
pub mod locate;
pub mod params;
pub mod path;
pub mod score;
pub mod seq;
pub mod tail;
pub mod trace;

pub use arena::Arena;
pub use cigar::{dump_cigar_forward, dump_cigar_reverse, print_cigar_forward, print_cigar_reverse};
pub use error::{GabaError, Result};
pub use fill::DpContext;
pub use locate::{search_max, MaxLocation};
pub use params::{Bandwidth, Model, ScoringParams};
pub use path::{Path, PathOp, PathSection};
pub use score::ScoreContext;
pub use seq::{Section, Strand};
pub use tail::{Status, TailId};
pub use trace::{trace, Seed, TraceParams, TraceResult};

/// Entry point: owns validated scoring parameters and hands out fresh
/// [`DpContext`]s built from them.
#[derive(Debug, Clone)]
pub struct EngineContext {
    params: ScoringParams,
}

impl EngineContext {
    pub fn new(params: ScoringParams) -> Result<Self> {
        params.validate()?;
        Ok(EngineContext { params })
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    pub fn new_dp_context(&self) -> DpContext {
        DpContext::new(ScoreContext::new(&self.params))
    }
}

/// Final alignment: score plus the reconstructed path and its section
/// breakdown, counted from a completed [`trace::trace`] walk.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub score: i64,
    pub xcnt: u32,
    pub micnt: u32,
    pub gicnt: u32,
    pub gecnt: u32,
    pub path: Path,
    pub sections: Vec<PathSection>,
}

/// Runs [`trace::trace`] from a located maximum and folds the resulting
/// path into an [`Alignment`], tallying per-operation-kind counts.
pub fn trace_to_alignment(dp: &DpContext, start: MaxLocation) -> Result<Alignment> {
    let result = trace(dp, start)?;
    let (xcnt, micnt, gicnt, gecnt) = tally_path(&result.path);
    Ok(Alignment { score: start.score, xcnt, micnt, gicnt, gecnt, path: result.path, sections: result.sections })
}

/// Counts match/mismatch/gap-open/gap-extend operations in `path`, the
/// derivation behind every [`Alignment`]'s `xcnt`/`micnt`/`gicnt`/`gecnt`.
pub(crate) fn tally_path(path: &Path) -> (u32, u32, u32, u32) {
    let mut xcnt = 0u32;
    let mut micnt = 0u32;
    let mut gicnt = 0u32;
    let mut gecnt = 0u32;
    let mut prev_op: Option<PathOp> = None;
    for op in path.iter() {
        match op {
            PathOp::Match => micnt += 1,
            PathOp::Mismatch => xcnt += 1,
            PathOp::Insertion | PathOp::Deletion => {
                if prev_op == Some(op) {
                    gecnt += 1;
                } else {
                    gicnt += 1;
                }
            }
        }
        prev_op = Some(op);
    }
    (xcnt, micnt, gicnt, gecnt)
}
