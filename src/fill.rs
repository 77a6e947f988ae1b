//! The fill engine: advances the antidiagonal band across a pair of
//! sections, journaling [`Block`]s and closing with a [`Tail`].
//!
//! Internally this tracks three rolling antidiagonal generations (the
//! textbook formulation of antidiagonal wavefront DP) rather than the
//! original's single-generation delta/offset trick; see `DESIGN.md` for
//! why. Boundary convention: this crate implements free-start semi-global
//! alignment, so any cell on the first row or first column of a section
//! costs zero, not `i * gap_cost`.

use derive_more::AddAssign;
use log::{debug, trace as log_trace};

use crate::block::Block;
use crate::params::BLK as BLK_USIZE;
use crate::error::Result;
use crate::params::Model;
use crate::score::{ScoreContext, NEG_INF};
use crate::seq::Section;
use crate::tail::{BlockId, ResumeState, Status, Tail, TailId};
use crate::Arena;

/// Running counters merged across every `fill()` call on a `DpContext`,
/// the way the teacher merges per-seed heuristic stats.
#[derive(Debug, Clone, Copy, Default, AddAssign)]
pub struct FillStats {
    pub calls: u32,
    pub blocks: u32,
    pub steps: u32,
}

pub struct DpContext {
    pub score: ScoreContext,
    pub blocks: Arena<Block>,
    pub tails: Arena<Tail>,
    pub stats: FillStats,
}

impl DpContext {
    pub fn new(score: ScoreContext) -> Self {
        let mut tails = Arena::new(16);
        tails.push(Tail::root(score.bw));
        DpContext { score, blocks: Arena::new(64), tails, stats: FillStats::default() }
    }

    pub fn root_tail(&self) -> TailId {
        0
    }

    /// Saves a checkpoint of both arenas, for later [`DpContext::restore_stack`].
    pub fn save_stack(&self) -> (crate::arena::Checkpoint, crate::arena::Checkpoint) {
        (self.blocks.save(), self.tails.save())
    }

    pub fn restore_stack(&mut self, cp: (crate::arena::Checkpoint, crate::arena::Checkpoint)) {
        self.blocks.restore(cp.0);
        self.tails.restore(cp.1);
    }

    pub fn flush(&mut self) {
        self.blocks.flush();
        self.tails.flush();
        self.tails.push(Tail::root(self.score.bw));
        self.stats = FillStats::default();
    }

    /// Starts a fresh fill call from the root tail.
    pub fn fill_root(&mut self, a: &Section, b: &Section) -> Result<TailId> {
        self.fill(self.root_tail(), a, b)
    }

    /// Extends the chain ending at `prev` across a new pair of sections.
    pub fn fill(&mut self, prev: TailId, a: &Section, b: &Section) -> Result<TailId> {
        let prev_tail = self.tails.get(prev).clone();
        if a.len == 0 && b.len == 0 {
            // An empty section pair folds into the chain as a no-op: the
            // tail is a copy of the previous one, only `ssum` advances.
            let mut t = prev_tail;
            t.prev = Some(prev);
            t.ssum += 1;
            let id = self.tails.push(t);
            return Ok(id);
        }
        if prev_tail.status.is_term() {
            debug!("fill: extending an already-terminated chain");
        }

        if prev_tail.last_block.is_none() && prev_tail.prev.is_none() {
            // Root call: verify an ungapped seed exists before committing
            // real work to a likely-unrelated pair of sections.
            if !ungapped_filter(a, b, self.score.filter_len) {
                log_trace!("fill_root: ungapped filter vetoed the start");
                let mut t = prev_tail;
                t.status |= Status::TERM;
                let id = self.tails.push(t);
                return Ok(id);
            }
        }

        let bw = self.score.bw;
        // Every section pair gets its own free-start (0, 0) origin; only
        // the chain-global running max / best cell carry over (see
        // `ResumeState::fresh_for_next_section`).
        let mut resume = ResumeState::fresh_for_next_section(bw, &prev_tail.resume);
        let mut status = Status::CONT;
        // This call's blocks form their own chain, rooted at `None`: their
        // coordinates are local to this section pair, so they must not
        // link into the previous call's differently-coordinated blocks.
        // Traceback crosses a section boundary via `Tail::prev`, not via
        // `Block::prev_block` (see `trace.rs`).
        let mut last_block: Option<BlockId> = None;
        // Antidiagonal count local to this call; `Tail::psum` accumulates
        // it across the whole chain.
        let mut p = 0i64;

        let mut call_stats = FillStats { calls: 1, blocks: 0, steps: 0 };

        'outer: loop {
            if resume.max_row_reached >= a.len as i64 && resume.max_col_reached >= b.len as i64 {
                status |= Status::UPDATE;
                break;
            }
            let mut block = Block::new(bw);
            block.prev_block = last_block;

            for _ in 0..BLK_USIZE {
                if resume.max_row_reached >= a.len as i64 && resume.max_col_reached >= b.len as i64 {
                    status |= Status::UPDATE;
                    break;
                }
                let a_exhausted = resume.max_row_reached >= a.len as i64;
                let b_exhausted = resume.max_col_reached >= b.len as i64;
                let down = if a_exhausted {
                    false
                } else if b_exhausted {
                    true
                } else {
                    resume.acc < 0
                };

                let step = advance(&self.score, a, b, down, &resume, p);
                resume.acc += step.front_back_diff.signum();
                resume.i0_diag = resume.i0_prev;
                resume.i0_prev = resume.i0_cur;
                resume.i0_cur = step.i0_cur;
                resume.m_diag = std::mem::take(&mut resume.m_prev);
                resume.m_prev = step.m_cur;
                resume.e_prev = step.e_cur;
                resume.f_prev = step.f_cur;
                p += 1;

                resume.max_row_reached = resume.max_row_reached.max((resume.i0_cur + bw as i64 - 1).min(a.len as i64));
                resume.max_col_reached = resume.max_col_reached.max((p - resume.i0_cur).min(b.len as i64));

                if step.best > resume.running_max {
                    resume.running_max = step.best;
                }
                if step.best > resume.best_score {
                    resume.best_score = step.best;
                    resume.best_row = step.best_row;
                    resume.best_col = p - step.best_row;
                    resume.best_tail = None; // filled in once this tail is pushed
                }

                let local_step = block.dir.len as usize;
                block.mask_diag[local_step] = step.mask_diag;
                block.mask_vert[local_step] = step.mask_vert;
                block.mask_mismatch[local_step] = step.mask_mismatch;
                block.dir.push(down);
                block.steps += 1;
                call_stats.steps += 1;

                if resume.running_max - step.best > self.score.x_drop {
                    log_trace!("fill: x-drop fired at antidiagonal {p}");
                    status |= Status::TERM;
                    break;
                }
            }

            block.i0 = resume.i0_cur;
            block.p = p;
            for k in 0..bw {
                let row = resume.i0_prev + k as i64;
                let col = p - row;
                let a_sym = if row > 0 && row <= a.len as i64 {
                    a.symbol((row - 1) as usize)
                } else {
                    0
                };
                let b_sym = if col > 0 && col <= b.len as i64 {
                    b.symbol((col - 1) as usize)
                } else {
                    0
                };
                block.char_vec[k] = (a_sym << 4) | (b_sym & 0x0f);
            }
            block.aridx = (a.len as i64 - resume.max_row_reached).max(0) as u32;
            block.bridx = (b.len as i64 - resume.max_col_reached).max(0) as u32;

            let this_block = self.blocks.push(block);
            last_block = Some(this_block);
            call_stats.blocks += 1;

            if status != Status::CONT {
                break 'outer;
            }
        }

        let tail = Tail {
            prev: Some(prev),
            last_block,
            psum: prev_tail.psum + p,
            p,
            ssum: prev_tail.ssum + 1,
            max: resume.running_max,
            status,
            apos: prev_tail.apos + prev_tail.alen,
            bpos: prev_tail.bpos + prev_tail.blen,
            alen: resume.max_row_reached.max(0) as u32,
            blen: resume.max_col_reached.max(0) as u32,
            aid: a.id,
            bid: b.id,
            resume,
        };
        let id = self.tails.push(tail);
        if self.tails.get(id).resume.best_tail.is_none() && self.tails.get(id).resume.best_score > 0 {
            self.tails.get_mut(id).resume.best_tail = Some(id);
        }
        self.stats += call_stats;
        Ok(id)
    }
}

struct StepResult {
    i0_cur: i64,
    m_cur: Vec<i64>,
    e_cur: Vec<i64>,
    f_cur: Vec<i64>,
    mask_diag: u32,
    mask_vert: u32,
    mask_mismatch: u32,
    best: i64,
    best_row: i64,
    front_back_diff: i64,
}

/// Computes one antidiagonal step (`p -> p+1`) for every lane.
fn advance(score: &ScoreContext, a: &Section, b: &Section, down: bool, resume: &ResumeState, p: i64) -> StepResult {
    let bw = resume.m_prev.len();
    let i0_cur = resume.i0_prev + if down { 1 } else { 0 };
    let p_cur = p + 1;
    let mut m_cur = vec![NEG_INF; bw];
    let mut e_cur = vec![NEG_INF; bw];
    let mut f_cur = vec![NEG_INF; bw];
    let mut mask_diag = 0u32;
    let mut mask_vert = 0u32;
    let mut mask_mismatch = 0u32;
    let mut best = NEG_INF;
    let mut best_row = i0_cur;

    for k in 0..bw {
        let row = i0_cur + k as i64;
        let col = p_cur - row;
        if row < 0 || col < 0 || row > a.len as i64 || col > b.len as i64 {
            continue;
        }
        if row == 0 || col == 0 {
            m_cur[k] = resume.section_origin;
            if m_cur[k] > best {
                best = m_cur[k];
                best_row = row;
            }
            continue;
        }

        let horiz_lane = k as i64 - 1 + if down { 1 } else { 0 };
        let vert_lane = k as i64 + if down { 1 } else { 0 };
        let horiz_m = lane_val(&resume.m_prev, horiz_lane);
        let vert_m = lane_val(&resume.m_prev, vert_lane);

        let (e_val, f_val) = match score.model {
            Model::Linear => {
                let gap = score.linear_gap_cost();
                (sat_sub(vert_m, gap), sat_sub(horiz_m, gap))
            }
            Model::Affine => {
                let e_continue = lane_val(&resume.e_prev, vert_lane);
                let f_continue = lane_val(&resume.f_prev, horiz_lane);
                let e = sat_sub(vert_m, score.gap_open).max(sat_sub(e_continue, score.gap_extend));
                let f = sat_sub(horiz_m, score.gap_open).max(sat_sub(f_continue, score.gap_extend));
                (e, f)
            }
        };
        e_cur[k] = e_val;
        f_cur[k] = f_val;

        let a_sym = a.symbol((row - 1) as usize);
        let b_sym = b.symbol((col - 1) as usize);
        let diag_lane = row - 1 - resume.i0_diag;
        let diag_m = lane_val(&resume.m_diag, diag_lane);
        let diag_val = sat_add(diag_m, score.diag_score(a_sym, b_sym));

        let chosen = if diag_val >= e_val && diag_val >= f_val {
            0
        } else if e_val >= f_val {
            1
        } else {
            2
        };
        m_cur[k] = match chosen {
            0 => diag_val,
            1 => e_val,
            _ => f_val,
        };
        if chosen == 0 {
            mask_diag |= 1 << k;
            if a_sym & b_sym == 0 {
                mask_mismatch |= 1 << k;
            }
        } else if chosen == 1 {
            mask_vert |= 1 << k;
        }

        if m_cur[k] > best {
            best = m_cur[k];
            best_row = row;
        }
    }

    let front = lane_val(&m_cur, bw as i64 - 1);
    let back = lane_val(&m_cur, 0);
    StepResult {
        i0_cur,
        m_cur,
        e_cur,
        f_cur,
        mask_diag,
        mask_vert,
        mask_mismatch,
        best,
        best_row,
        front_back_diff: sat_sub(front, back),
    }
}

fn lane_val(v: &[i64], idx: i64) -> i64 {
    if idx < 0 || idx as usize >= v.len() {
        NEG_INF
    } else {
        v[idx as usize]
    }
}

fn sat_add(a: i64, b: i64) -> i64 {
    if a <= NEG_INF { NEG_INF } else { a + b }
}

fn sat_sub(a: i64, b: i64) -> i64 {
    if a <= NEG_INF { NEG_INF } else { a - b }
}

/// Scans a short window at the very start of `a`/`b` for a run of at
/// least `filter_len` consecutive diagonal matches, used to veto a root
/// fill whose two sections plainly don't share an alignment.
fn ungapped_filter(a: &Section, b: &Section, filter_len: usize) -> bool {
    let span = a.len.min(b.len);
    if span < filter_len {
        return span > 0 && (0..span).all(|i| a.symbol(i) & b.symbol(i) != 0);
    }
    let mut run = 0usize;
    for i in 0..span {
        if a.symbol(i) & b.symbol(i) != 0 {
            run += 1;
            if run >= filter_len {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
