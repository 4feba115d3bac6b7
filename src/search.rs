//! The active-list dynamic-programming search and path reconstruction.
//!
//! Nodes are allocated in a [`bumpalo::Bump`] arena scoped to one
//! `break_lines` call and released in a single deallocation when the call
//! returns, avoiding per-node deallocation during the search itself. The
//! active list is a plain `Vec` of arena references rather than an
//! intrusive linked list of raw pointers: the same algorithm, expressed
//! without manual pointer-link mutation.

extern crate alloc;
use alloc::vec::Vec;

use bumpalo::Bump;

use crate::item::{flagged_at, Item};
use crate::legality::{after, is_forced_break, is_legal_break};
use crate::measure::{length, shrink, stretch};
use crate::numeric::{adjustment_ratio, badness, demerits, Fitness};
use crate::num::Num;
use crate::prefix::PrefixSums;
use crate::{BreakError, BreakOptions, InvalidInputReason, Line};

/// A node in the breakpoint lattice.
struct Node<'bump, N> {
    /// Index of the breakpoint item, or `-1` for the paragraph-start
    /// sentinel.
    position: isize,
    /// Start index of the line following this break.
    after: usize,
    /// 1-based count of lines ending at this break (0 for the sentinel).
    line: usize,
    /// Adjustment ratio of the line ending here.
    adjustment_ratio: N,
    /// Fitness class of the line ending here.
    fitness: Fitness,
    /// Total demerits from the paragraph start to this break.
    total_demerits: N,
    /// Parent node: the break that starts the line ending here.
    previous: Option<&'bump Node<'bump, N>>,
}

/// A feasible extension from some active node to the breakpoint currently
/// being processed, not yet committed to the active list.
struct Candidate<'bump, N> {
    parent: &'bump Node<'bump, N>,
    adjustment_ratio: N,
    total_demerits: N,
}

/// Tracks, per fitness class, the lowest-demerit candidate seen so far:
/// only the single best candidate per fitness band survives to become a
/// new active node.
struct BestPerFitness<'bump, N> {
    slots: [Option<Candidate<'bump, N>>; 4],
}

impl<'bump, N: Num> BestPerFitness<'bump, N> {
    fn new() -> Self {
        BestPerFitness {
            slots: [None, None, None, None],
        }
    }

    fn consider(&mut self, fitness: Fitness, candidate: Candidate<'bump, N>) {
        let slot = &mut self.slots[fitness as usize];
        let better = match slot {
            None => true,
            Some(existing) => candidate.total_demerits < existing.total_demerits,
        };
        if better {
            *slot = Some(candidate);
        }
    }

    fn any(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    fn into_nodes(
        self,
        bump: &'bump Bump,
        position: usize,
        next_after: usize,
    ) -> Vec<&'bump Node<'bump, N>> {
        self.slots
            .into_iter()
            .flatten()
            .map(|c| {
                &*bump.alloc(Node {
                    position: position as isize,
                    after: next_after,
                    line: c.parent.line + 1,
                    adjustment_ratio: c.adjustment_ratio,
                    fitness: Fitness::of(c.adjustment_ratio),
                    total_demerits: c.total_demerits,
                    previous: Some(c.parent),
                })
            })
            .collect()
    }
}

/// The target width for the line that would follow `a`, i.e. line number
/// `a.line + 1`. `break_lines` only ever hands callers a single scalar
/// width, but this indirection is kept so a caller-visible per-line width
/// (a first-line indent, a pull-quote notch) is a one-line change here
/// rather than a threading exercise through the whole search.
fn target_width_for_line<N: Num>(target_width: N, _line: usize) -> N {
    target_width
}

/// Computes the adjustment ratio, badness, and demerits of extending `a` to
/// break `b`, without clamping an overfull ratio.
fn extend<T, N: Num>(
    items: &[Item<T, N>],
    sums: &PrefixSums<N>,
    target_width: N,
    options: &BreakOptions<N>,
    a: &Node<N>,
    b: usize,
) -> (N, N) {
    let l = length(items, sums, a.after, b);
    let y = stretch(sums, a.after, b);
    let z = shrink(sums, a.after, b);
    let w = target_width_for_line(target_width, a.line + 1);
    let r = adjustment_ratio(l, y, z, w);
    let d = line_demerits(items, options, a, b, r);
    (r, d)
}

fn line_demerits<T, N: Num>(
    items: &[Item<T, N>],
    options: &BreakOptions<N>,
    a: &Node<N>,
    b: usize,
    r: N,
) -> N {
    let beta = badness(r);
    let p = items[b].penalty();
    let flagged_adjacency = items[b].flagged() && flagged_at(items, a.position);
    let fitness_jump = Fitness::of(r).distance(a.fitness) > 1;
    a.total_demerits
        + demerits(
            options.line_penalty,
            beta,
            p,
            flagged_adjacency,
            fitness_jump,
            options.flagged_demerit,
            options.fitness_demerit,
        )
}

/// Runs the search and returns the lowest-demerit terminal node, still
/// owned by `bump`.
fn search<'bump, T, N: Num>(
    items: &[Item<T, N>],
    sums: &PrefixSums<N>,
    target_width: N,
    options: &BreakOptions<N>,
    bump: &'bump Bump,
) -> Result<&'bump Node<'bump, N>, BreakError> {
    let sentinel: &'bump Node<'bump, N> = bump.alloc(Node {
        position: -1,
        after: 0,
        line: 0,
        adjustment_ratio: N::from_i32(1),
        fitness: Fitness::Normal,
        total_demerits: N::ZERO,
        previous: None,
    });

    let mut active: Vec<&'bump Node<'bump, N>> = alloc::vec![sentinel];

    for b in 0..items.len() {
        if !is_legal_break(items, b) {
            continue;
        }
        let forced = is_forced_break(items, b);
        let previous_active = core::mem::take(&mut active);

        let mut kept = Vec::new();
        let mut best = BestPerFitness::new();
        for a in &previous_active {
            let (r, d) = extend(items, sums, target_width, options, a, b);
            let passive = r < N::from_i32(-1) || forced;
            if !passive {
                kept.push(*a);
            }
            if r >= N::from_i32(-1) && r < options.p_tolerance {
                best.consider(
                    Fitness::of(r),
                    Candidate {
                        parent: a,
                        adjustment_ratio: r,
                        total_demerits: d,
                    },
                );
            }
        }

        if kept.is_empty() && !best.any() {
            // Overfull fallback: force every previously active node to
            // extend to `b` using r' = max(-1, r), so the search always
            // makes progress even when nothing fits within tolerance.
            let mut fallback = BestPerFitness::new();
            for a in &previous_active {
                let (r, _) = extend(items, sums, target_width, options, a, b);
                let clamped = if r < N::from_i32(-1) { N::from_i32(-1) } else { r };
                let d = line_demerits(items, options, a, b, clamped);
                fallback.consider(
                    Fitness::of(clamped),
                    Candidate {
                        parent: a,
                        adjustment_ratio: clamped,
                        total_demerits: d,
                    },
                );
            }
            active = fallback.into_nodes(bump, b, after(items, b));
        } else {
            let mut next_active = kept;
            next_active.extend(best.into_nodes(bump, b, after(items, b)));
            active = next_active;
        }

        if active.is_empty() {
            return Err(BreakError::NoSolution);
        }
    }

    active
        .into_iter()
        .min_by(|a, b| {
            a.total_demerits
                .partial_cmp(&b.total_demerits)
                .unwrap_or(core::cmp::Ordering::Equal)
        })
        .ok_or(BreakError::NoSolution)
}

/// Walks the chosen node's parent chain into an ordered line list.
fn reconstruct<'bump, N: Num>(mut node: &'bump Node<'bump, N>) -> Vec<Line<N>> {
    let mut lines = Vec::with_capacity(node.line);
    while let Some(previous) = node.previous {
        lines.push(Line {
            start: previous.after,
            end: node.position as usize,
            adjustment_ratio: node.adjustment_ratio,
        });
        node = previous;
    }
    lines.reverse();
    lines
}

/// The degenerate `target_width = +∞` driver: only forced breaks matter,
/// and every forced break produces exactly one line with adjustment ratio
/// `0`.
fn break_forced_only<T, N: Num>(items: &[Item<T, N>]) -> Vec<Line<N>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, item) in items.iter().enumerate() {
        if item.is_forced_break() {
            lines.push(Line {
                start,
                end: i,
                adjustment_ratio: N::ZERO,
            });
            start = after(items, i);
        }
    }
    lines
}

pub(crate) fn validate<T, N: Num>(items: &[Item<T, N>]) -> Result<(), BreakError> {
    match items.first() {
        None => return Err(BreakError::InvalidInput(InvalidInputReason::Empty)),
        Some(first) if !first.is_box() => {
            return Err(BreakError::InvalidInput(
                InvalidInputReason::DoesNotStartWithBox,
            ))
        }
        _ => {}
    }
    match items.last() {
        Some(last) if last.is_forced_break() => Ok(()),
        _ => Err(BreakError::InvalidInput(
            InvalidInputReason::DoesNotEndWithForcedPenalty,
        )),
    }
}

pub(crate) fn break_lines<T, N: Num>(
    items: &[Item<T, N>],
    target_width: N,
    options: &BreakOptions<N>,
) -> Result<Vec<Line<N>>, BreakError> {
    validate(items)?;

    if target_width == N::INFINITY {
        return Ok(break_forced_only(items));
    }

    let sums = PrefixSums::build(items);
    let bump = Bump::new();
    let winner = search(items, &sums, target_width, options, &bump)?;
    Ok(reconstruct(winner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    fn box_(w: f64) -> Item<(), f64> {
        Item::Box {
            width: w,
            value: (),
        }
    }
    fn glue(w: f64, y: f64, z: f64) -> Item<(), f64> {
        Item::Glue {
            width: w,
            stretch: y,
            shrink: z,
            value: (),
        }
    }
    fn penalty(p: f64, flagged: bool) -> Item<(), f64> {
        Item::Penalty {
            width: 0.0,
            penalty: p,
            flagged,
            value: (),
        }
    }

    #[test]
    fn rejects_empty_input() {
        let items: [Item<(), f64>; 0] = [];
        assert_eq!(
            break_lines(&items, 10.0, &BreakOptions::default()),
            Err(BreakError::InvalidInput(InvalidInputReason::Empty))
        );
    }

    #[test]
    fn rejects_stream_not_starting_with_box() {
        let items = [glue(1.0, 1.0, 0.0), penalty(f64::NEG_INFINITY, false)];
        assert_eq!(
            break_lines(&items, 10.0, &BreakOptions::default()),
            Err(BreakError::InvalidInput(
                InvalidInputReason::DoesNotStartWithBox
            ))
        );
    }

    #[test]
    fn rejects_stream_not_ending_with_forced_penalty() {
        let items = [box_(1.0), glue(1.0, 1.0, 0.0)];
        assert_eq!(
            break_lines(&items, 10.0, &BreakOptions::default()),
            Err(BreakError::InvalidInput(
                InvalidInputReason::DoesNotEndWithForcedPenalty
            ))
        );
    }

    #[test]
    fn degenerate_single_stretch_line_s1() {
        // The glue's own stretch belongs to the line it would start, not
        // the line that breaks at it (items[a, b) excludes b), so the only
        // breakpoint that can actually use this glue's stretch is the
        // forced terminator that follows it.
        let items = [box_(10.0), glue(5.0, 5.0, 0.0), penalty(f64::NEG_INFINITY, false)];
        let lines = break_lines(&items, 20.0, &BreakOptions::default()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].start, 0);
        assert_eq!(lines[0].end, 2);
        assert!((lines[0].adjustment_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn two_words_fit_on_one_line_s2() {
        let items = [
            box_(20.0),
            glue(5.0, 3.0, 1.0),
            box_(30.0),
            glue(0.0, 0.0, 0.0),
            penalty(f64::NEG_INFINITY, false),
        ];
        let lines = break_lines(&items, 55.0, &BreakOptions::default()).unwrap();
        assert_eq!(lines.len(), 1);
        assert!((lines[0].adjustment_ratio - 0.0).abs() < 1e-9);
    }

    #[test]
    fn must_break_into_multiple_lines() {
        // A paragraph several times wider than the target: it is
        // structurally impossible to fit on one line, so the search must
        // produce more than one. Checked against general properties
        // (terminal alignment, coverage, monotonicity) rather than a
        // specific break pattern, since which exact breakpoints win is a
        // function of the whole demerit landscape.
        let mut items = Vec::new();
        for word in 0..12 {
            if word > 0 {
                items.push(glue(4.0, 3.0, 1.0));
            }
            items.push(box_(20.0));
        }
        items.push(glue(0.0, 0.0, 0.0));
        items.push(penalty(f64::NEG_INFINITY, false));

        let lines = break_lines(&items, 60.0, &BreakOptions::default()).unwrap();
        assert!(lines.len() > 1);

        // Terminal alignment: the last line ends at the final forced penalty.
        assert_eq!(lines.last().unwrap().end, items.len() - 1);
        // Coverage/monotonicity: each line starts where the previous one's
        // end was skipped forward to by after(), and lines strictly
        // advance.
        assert_eq!(lines[0].start, 0);
        for w in lines.windows(2) {
            assert_eq!(w[1].start, after(&items, w[0].end));
            assert!(w[1].end > w[0].end);
        }
    }

    #[test]
    fn infinite_width_yields_one_line_per_forced_break() {
        let items = [
            box_(10.0),
            glue(1.0, 1.0, 0.0),
            box_(10.0),
            penalty(f64::NEG_INFINITY, false),
            box_(10.0),
            penalty(f64::NEG_INFINITY, false),
        ];
        let lines = break_lines(&items, f64::INFINITY, &BreakOptions::default()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].end, 3);
        assert_eq!(lines[1].end, 5);
        assert!(lines.iter().all(|l| l.adjustment_ratio == 0.0));
    }

    #[test]
    fn overfull_fallback_still_returns_a_line_list_s6() {
        // No glue anywhere: nothing can stretch or shrink, so no extension
        // ever lands in [-1, p_tolerance). The fallback must still produce
        // a line.
        let items = [
            box_(1000.0),
            penalty(0.0, false),
            box_(1000.0),
            penalty(f64::NEG_INFINITY, false),
        ];
        let lines = break_lines(&items, 10.0, &BreakOptions::default()).unwrap();
        assert!(!lines.is_empty());
        assert!(lines.iter().any(|l| (l.adjustment_ratio - (-1.0)).abs() < 1e-9));
    }
}
