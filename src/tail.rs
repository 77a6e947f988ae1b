//! Joint tail: the 64-byte-equivalent per-section summary that terminates
//! a fill call and anchors the next one.

use std::ops::{BitOr, BitOrAssign};

/// Bitset of why a fill call stopped. Hand-rolled rather than pulled from
/// a `bitflags`-style crate, since the set is small and fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status(u32);

impl Status {
    pub const CONT: Status = Status(0x00);
    pub const UPDATE_A: Status = Status(0x01);
    pub const UPDATE_B: Status = Status(0x02);
    pub const UPDATE: Status = Status(0x03);
    pub const TERM: Status = Status(0x04);

    pub fn contains(self, other: Status) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_term(self) -> bool {
        self.contains(Status::TERM)
    }
}

impl BitOr for Status {
    type Output = Status;
    fn bitor(self, rhs: Status) -> Status {
        Status(self.0 | rhs.0)
    }
}

impl BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Status) {
        self.0 |= rhs.0;
    }
}

pub type BlockId = usize;
pub type TailId = usize;

/// Per-section fill result, forming a singly-linked chain back through
/// every earlier call on the same alignment.
#[derive(Debug, Clone)]
pub struct Tail {
    pub prev: Option<TailId>,
    pub last_block: Option<BlockId>,
    /// Sum of antidiagonal steps taken across the whole chain up to here.
    pub psum: i64,
    /// Antidiagonal steps taken within this call.
    pub p: i64,
    /// Running count of sections folded into this chain.
    pub ssum: u32,
    pub max: i64,
    pub status: Status,
    pub apos: u32,
    pub bpos: u32,
    pub alen: u32,
    pub blen: u32,
    pub aid: u32,
    pub bid: u32,
    /// Live recentring state needed to resume fill from this tail. The
    /// original keeps this inside the arena's last block and treats the
    /// tail as a fixed-size summary; this crate keeps it here directly
    /// (see `DESIGN.md`).
    pub resume: ResumeState,
}

/// The last three antidiagonal generations of a fill call, kept so a
/// later [`crate::fill::DpContext::fill`] call can pick up exactly where
/// the previous one stopped.
#[derive(Debug, Clone)]
pub struct ResumeState {
    pub i0_diag: i64,
    pub i0_prev: i64,
    pub i0_cur: i64,
    pub m_diag: Vec<i64>,
    pub m_prev: Vec<i64>,
    pub e_prev: Vec<i64>,
    pub f_prev: Vec<i64>,
    pub max_row_reached: i64,
    pub max_col_reached: i64,
    pub running_max: i64,
    pub acc: i64,
    /// Best cell seen anywhere in the chain so far, in cumulative
    /// (tail-local) coordinates plus the tail it was found in.
    pub best_score: i64,
    pub best_row: i64,
    pub best_col: i64,
    pub best_tail: Option<TailId>,
    /// Score a cell on this section's free-start boundary (`row == 0` or
    /// `col == 0`) takes. `0` for the very first section of a chain; for a
    /// section continuing an earlier one, this is the previous section's
    /// best score, so the alignment's score keeps accumulating across
    /// section joins instead of resetting at every boundary.
    pub section_origin: i64,
}

impl ResumeState {
    pub fn empty(bw: usize) -> Self {
        Self::with_origin(bw, 0)
    }

    fn with_origin(bw: usize, origin: i64) -> Self {
        // Seed lane 0 of the "prev" generation with the free-start origin
        // cell (0, 0) = `origin`, so the first real diagonal step off the
        // origin sees it as a diagonal predecessor two steps later.
        // `m_diag` is left all-NEG_INF: there is no generation before the
        // origin.
        let mut m_prev = vec![crate::score::NEG_INF; bw];
        m_prev[0] = origin;
        ResumeState {
            i0_diag: 0,
            i0_prev: 0,
            i0_cur: 0,
            m_diag: vec![crate::score::NEG_INF; bw],
            m_prev,
            e_prev: vec![crate::score::NEG_INF; bw],
            f_prev: vec![crate::score::NEG_INF; bw],
            max_row_reached: -1,
            max_col_reached: -1,
            running_max: 0,
            acc: 0,
            best_score: 0,
            best_row: 0,
            best_col: 0,
            best_tail: None,
            section_origin: origin,
        }
    }

    /// Starts the local wavefront fresh for a new section pair, carrying
    /// over only the state that genuinely spans the whole chain: the
    /// running maximum (the X-drop baseline), the best cell seen so far
    /// anywhere in the chain, and the score the new section's free-start
    /// boundary continues from. Every section pair gets its own local
    /// `(row, col) = (0, 0)` origin — row/col indices are always local to
    /// the section a given `fill()` call was handed, so carrying over the
    /// previous call's `i0`/`m_prev` would index into the new,
    /// differently-sized section with stale coordinates — but the score
    /// at that local origin continues from wherever the previous section
    /// left its best alignment, so concatenated sections accumulate one
    /// running score rather than each restarting at zero.
    pub fn fresh_for_next_section(bw: usize, prior: &Self) -> Self {
        let mut fresh = Self::with_origin(bw, prior.best_score.max(0));
        fresh.running_max = prior.running_max;
        fresh.best_score = prior.best_score;
        fresh.best_row = prior.best_row;
        fresh.best_col = prior.best_col;
        fresh.best_tail = prior.best_tail;
        fresh
    }
}

impl Tail {
    pub fn root(bw: usize) -> Self {
        Tail {
            prev: None,
            last_block: None,
            psum: 0,
            p: 0,
            ssum: 0,
            max: 0,
            status: Status::CONT,
            apos: 0,
            bpos: 0,
            alen: 0,
            blen: 0,
            aid: u32::MAX,
            bid: u32::MAX,
            resume: ResumeState::empty(bw),
        }
    }
}
