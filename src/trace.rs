//! Traceback: walks the block journal backward from a chosen endpoint,
//! reading the per-step masks recorded during fill to recover the
//! alignment path.
//!
//! Crossing from one tail's block chain into `tail.prev`'s is only valid
//! when both the row and column have returned to the free-start boundary
//! (0, 0) simultaneously — see the "Section-join breakpoint" decision in
//! `DESIGN.md`. Reaching the boundary with only one coordinate at zero
//! means the best alignment genuinely starts partway through this
//! section's sequences, and tracing stops there without crossing into an
//! earlier tail.

use crate::block::Block;
use crate::error::{GabaError, Result};
use crate::fill::DpContext;
use crate::locate::{search_max, MaxLocation};
use crate::path::{Path, PathOp, PathSection};
use crate::tail::TailId;
use crate::{tally_path, Alignment};

pub struct TraceResult {
    pub path: Path,
    pub sections: Vec<PathSection>,
}

pub fn trace(dp: &DpContext, start: MaxLocation) -> Result<TraceResult> {
    let mut path = Path::new();
    let mut sections: Vec<PathSection> = Vec::new();

    let mut cur_tail = start.tail;
    let mut row = start.row;
    let mut col = start.col;
    let mut section_start_len = 0usize;

    loop {
        let tail = dp.tails.get(cur_tail);
        let mut block_id = tail.last_block;

        loop {
            let Some(bid) = block_id else { break };
            let block: &Block = dp.blocks.get(bid);
            let p_start = block.p - block.steps as i64;
            if row + col <= p_start {
                block_id = block.prev_block;
                continue;
            }
            let s = (row + col - p_start - 1) as i64;
            if s < 0 || s as u32 >= block.steps {
                block_id = block.prev_block;
                continue;
            }
            let s = s as usize;
            let i0_start = block.i0 - block.dir.down_count() as i64;
            let down_before = block.dir.prefix_down_count(s + 1);
            let i0_at_s = i0_start + down_before as i64;
            let lane = row - i0_at_s;
            let bw = block.char_vec.len();
            if lane < 0 || lane as usize >= bw {
                return Err(GabaError::PathLostOutOfBand { p: row + col, lane: lane.max(0) as usize });
            }
            let lane = lane as usize;
            let is_diag = (block.mask_diag[s] >> lane) & 1 == 1;
            let is_vert = (block.mask_vert[s] >> lane) & 1 == 1;
            if is_diag {
                let is_mismatch = (block.mask_mismatch[s] >> lane) & 1 == 1;
                path.push(if is_mismatch { PathOp::Mismatch } else { PathOp::Match });
                row -= 1;
                col -= 1;
            } else if is_vert {
                path.push(PathOp::Insertion);
                col -= 1;
            } else {
                path.push(PathOp::Deletion);
                row -= 1;
            }
            if row == 0 && col == 0 {
                break;
            }
        }

        let section_len = path.len() - section_start_len;
        sections.push(PathSection {
            aid: tail.aid,
            bid: tail.bid,
            apos: tail.apos,
            bpos: tail.bpos,
            alen: tail.alen,
            blen: tail.blen,
            path_offset: section_start_len,
            path_len: section_len,
        });
        section_start_len = path.len();

        if row == 0 && col == 0 {
            match tail.prev {
                Some(pt) if dp.tails.get(pt).last_block.is_some() || dp.tails.get(pt).prev.is_some() => {
                    cur_tail = pt;
                    let ptail = dp.tails.get(pt);
                    row = ptail.alen as i64;
                    col = ptail.blen as i64;
                    continue;
                }
                _ => break,
            }
        }
        break;
    }

    sections.reverse();
    let total = path.len();
    for s in &mut sections {
        s.path_offset = total - s.path_offset - s.path_len;
    }
    let forward = path.reversed();
    Ok(TraceResult { path: forward, sections })
}

/// A central "match" segment joining a reverse-extension trace to a
/// forward-extension trace, used by seed-extension callers: the seed
/// itself is never filled, only assumed to score `len` diagonal matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct Seed {
    pub len: u32,
}

/// Parameters to [`DpContext::trace`] beyond the two tail handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceParams {
    pub seed: Option<Seed>,
}

impl DpContext {
    /// Traces a forward tail, a reverse tail, or both, joining them around
    /// an optional seed. A reverse tail is understood to extend away from
    /// the join point, so its recovered path and section list are flipped
    /// back before splicing, restoring the 5'-to-3' reading order the
    /// combined alignment needs. Returns `Ok(None)` when neither tail is
    /// given — there is nothing to trace.
    pub fn trace(
        &self,
        fw: Option<TailId>,
        rv: Option<TailId>,
        params: &TraceParams,
    ) -> Result<Option<Alignment>> {
        if fw.is_none() && rv.is_none() {
            return Ok(None);
        }

        let mut path = Path::new();
        let mut sections: Vec<PathSection> = Vec::new();
        let mut score = 0i64;

        if let Some(rv_id) = rv {
            let loc = search_max(self, rv_id);
            score += loc.score;
            let result = trace(self, loc)?;
            splice_reversed(&mut path, &mut sections, &result);
        }

        if let Some(seed) = params.seed {
            let path_offset = path.len();
            for _ in 0..seed.len {
                path.push(PathOp::Match);
            }
            sections.push(PathSection {
                aid: u32::MAX,
                bid: u32::MAX,
                apos: 0,
                bpos: 0,
                alen: seed.len,
                blen: seed.len,
                path_offset,
                path_len: seed.len as usize,
            });
        }

        if let Some(fw_id) = fw {
            let loc = search_max(self, fw_id);
            score += loc.score;
            let result = trace(self, loc)?;
            splice_forward(&mut path, &mut sections, &result);
        }

        merge_adjacent_sections(&mut sections);

        let (xcnt, micnt, gicnt, gecnt) = tally_path(&path);
        Ok(Some(Alignment { score, xcnt, micnt, gicnt, gecnt, path, sections }))
    }
}

/// Appends `result`'s path and sections onto `path`/`sections` unchanged,
/// offsetting section bookkeeping by how much was already in `path`.
fn splice_forward(path: &mut Path, sections: &mut Vec<PathSection>, result: &TraceResult) {
    let base = path.len();
    path.append(&result.path);
    sections.extend(result.sections.iter().map(|s| {
        let mut s = *s;
        s.path_offset += base;
        s
    }));
}

/// Appends `result`'s path and sections in reverse order, as required when
/// splicing in a reverse-extension trace ahead of the seed/forward half.
fn splice_reversed(path: &mut Path, sections: &mut Vec<PathSection>, result: &TraceResult) {
    let base = path.len();
    let total = result.path.len();
    path.append(&result.path.reversed());
    sections.extend(result.sections.iter().rev().map(|s| {
        let mut s = *s;
        s.path_offset = base + (total - s.path_offset - s.path_len);
        s
    }));
}

/// Collapses adjacent sections whose coordinates meet exactly at a join —
/// a seed or a forward/reverse splice point that lands mid-section rather
/// than on a clean boundary — per the "section concatenation" rule.
fn merge_adjacent_sections(sections: &mut Vec<PathSection>) {
    let mut merged: Vec<PathSection> = Vec::with_capacity(sections.len());
    for s in sections.drain(..) {
        if let Some(last) = merged.last_mut() {
            if last.aid == s.aid
                && last.bid == s.bid
                && last.apos + last.alen == s.apos
                && last.bpos + last.blen == s.bpos
            {
                last.alen += s.alen;
                last.blen += s.blen;
                last.path_len += s.path_len;
                continue;
            }
        }
        merged.push(s);
    }
    *sections = merged;
}
