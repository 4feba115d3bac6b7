#![cfg_attr(not(feature = "std"), no_std)]

//! Knuth–Plass optimal paragraph line breaking.
//!
//! This crate is the numeric core of a paragraph line breaker: given an
//! already-measured stream of [`Item`]s (boxes, glue, penalties) and a
//! target line width, [`break_lines`] computes the globally optimal
//! partition into lines by dynamic programming over feasible breakpoints,
//! following Knuth & Plass's 1981 algorithm as used by TeX.
//!
//! Glyph shaping, font metrics, hyphenation, and rendering are the
//! caller's job: this crate only ever sees already-measured items and
//! produces [`Line`] records describing where to break and by how much to
//! stretch or shrink each line's glue.
//!
//! ```
//! use knuth_plass::{break_lines, BreakOptions, Item};
//!
//! // "a bb ccc" against a target width wide enough that it all fits on
//! // one stretched-out line.
//! let items = vec![
//!     Item::Box { width: 1.0, value: "a" },
//!     Item::Glue { width: 1.0, stretch: 1.0, shrink: 0.5, value: " " },
//!     Item::Box { width: 2.0, value: "bb" },
//!     Item::Glue { width: 1.0, stretch: 1.0, shrink: 0.5, value: " " },
//!     Item::Box { width: 3.0, value: "ccc" },
//!     Item::Glue { width: 0.0, stretch: 0.0, shrink: 0.0, value: "" },
//!     Item::Penalty { width: 0.0, penalty: f64::NEG_INFINITY, flagged: false, value: "" },
//! ];
//! let lines = break_lines(&items, 100.0, &BreakOptions::default()).unwrap();
//! assert_eq!(lines.len(), 1);
//! assert!(lines[0].adjustment_ratio > 0.0);
//! ```

extern crate alloc;
use alloc::vec::Vec;

mod error;
mod item;
mod legality;
mod measure;
mod num;
mod numeric;
mod prefix;
mod search;

pub use error::{BreakError, InvalidInputReason};
pub use item::Item;
pub use num::{Fixed, Num};
pub use numeric::Fitness;

/// One line of the chosen layout: the item range it covers and the
/// adjustment ratio to apply to its glue when rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<N> {
    /// Start index of the line (inclusive); equals `after()` of the
    /// previous breakpoint, or `0` for the first line.
    pub start: usize,
    /// End index of the line (exclusive); the breakpoint item itself.
    pub end: usize,
    /// The adjustment ratio `r` computed for this line. Negative values
    /// shrink glue, positive values stretch it.
    pub adjustment_ratio: N,
}

/// Tunable parameters for [`break_lines`].
///
/// Defaults match the constants Knuth & Plass specify for TeX: a
/// tolerance of 1.26, a line penalty of 1, and flagged/fitness demerits of
/// 1000. There is no `HYPHEN_PENALTY` field here: that's a convention for
/// how callers should cost a `Penalty` item representing a hyphenation
/// point, not a knob the search itself reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakOptions<N> {
    /// `ρ`: candidates whose adjustment ratio is `>=` this are infeasible.
    pub p_tolerance: N,
    /// `LP`: flat per-line cost; larger values discourage more lines.
    pub line_penalty: N,
    /// `ALPHA`: extra demerit when both line-ending penalties are flagged.
    pub flagged_demerit: N,
    /// `GAMMA`: extra demerit when adjacent lines' fitness classes differ
    /// by more than one band.
    pub fitness_demerit: N,
}

impl<N: Num> BreakOptions<N> {
    /// Options with the default constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the adjustment-ratio tolerance `ρ`. Default `1.26`.
    pub fn with_p_tolerance(mut self, p_tolerance: N) -> Self {
        self.p_tolerance = p_tolerance;
        self
    }

    /// Sets the per-line penalty `LP`. Default `1`.
    pub fn with_line_penalty(mut self, line_penalty: N) -> Self {
        self.line_penalty = line_penalty;
        self
    }

    /// Sets the flagged-adjacency demerit `ALPHA`. Default `1000`.
    pub fn with_flagged_demerit(mut self, flagged_demerit: N) -> Self {
        self.flagged_demerit = flagged_demerit;
        self
    }

    /// Sets the fitness-class-jump demerit `GAMMA`. Default `1000`.
    pub fn with_fitness_demerit(mut self, fitness_demerit: N) -> Self {
        self.fitness_demerit = fitness_demerit;
        self
    }
}

impl<N: Num> Default for BreakOptions<N> {
    fn default() -> Self {
        BreakOptions {
            p_tolerance: N::from_i32(126) / N::from_i32(100),
            line_penalty: N::from_i32(1),
            flagged_demerit: N::from_i32(1000),
            fitness_demerit: N::from_i32(1000),
        }
    }
}

/// Computes the optimal line breaks for `items` against `target_width`.
///
/// `items` must start with a [`Item::Box`] and end with an
/// [`Item::Penalty`] of cost `-∞` (the caller is responsible for inserting
/// hyphenation penalties and an end-of-paragraph sentinel); violating this
/// is reported as [`BreakError::InvalidInput`].
///
/// `target_width = N::INFINITY` degenerates to a forced-breaks-only
/// driver: every `Item::Penalty` with cost `-∞` starts a new line, and
/// every line's adjustment ratio is `0`.
///
/// Returns the chosen lines in paragraph order, or
/// [`BreakError::NoSolution`] if the active set empties out without ever
/// reaching a terminal node (only possible if `items` violates its
/// contract in a way `InvalidInput` didn't already catch).
pub fn break_lines<T, N: Num>(
    items: &[Item<T, N>],
    target_width: N,
    options: &BreakOptions<N>,
) -> Result<Vec<Line<N>>, BreakError> {
    search::break_lines(items, target_width, options)
}
