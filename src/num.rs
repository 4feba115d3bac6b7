//! Numeric abstraction over the width/ratio/demerit representation.
//!
//! The search and demerit formulas in [`crate::search`] are written against
//! this trait rather than a concrete float so that callers who represent
//! widths as fixed-point "scaled points" (as real typesetting engines do)
//! can plug in [`Fixed`] instead of `f32`/`f64`.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// A numeric type usable for widths, stretch/shrink, adjustment ratios, and
/// demerits.
///
/// Implementors must be able to represent `+∞` and `-∞` (used for
/// unshrinkable/unstretchable adjustment ratios and forced-break penalties)
/// and must propagate them through the arithmetic the way IEEE 754 does.
pub trait Num:
    Copy
    + Default
    + PartialOrd
    + PartialEq
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
{
    /// The additive identity.
    const ZERO: Self;
    /// Positive infinity.
    const INFINITY: Self;
    /// Negative infinity.
    const NEG_INFINITY: Self;

    /// Converts a small integer literal into `Self`.
    ///
    /// There is deliberately no `Num::ONE` constant: zero-integer-bit signed
    /// fixed-point formats (e.g. `I0F32`) can't represent `1` as a
    /// compile-time constant of their own type, so "one" has to go through
    /// this conversion instead.
    fn from_i32(v: i32) -> Self;

    /// Absolute value. Implemented generically via comparison against
    /// [`Num::ZERO`] rather than a platform `abs()` intrinsic, so no
    /// `libm`/`std` float method is required even in `no_std`.
    fn abs(self) -> Self {
        if self < Self::ZERO {
            -self
        } else {
            self
        }
    }

    /// Raises `self` to a small non-negative integer power. The badness and
    /// demerit formulas only ever need squares and cubes, so this is a plain
    /// repeated multiplication rather than a transcendental `powf`.
    fn powi(self, n: u32) -> Self {
        let mut r = Self::from_i32(1);
        for _ in 0..n {
            r = r * self;
        }
        r
    }

    /// `true` unless `self` is `+∞` or `-∞`.
    fn is_finite(self) -> bool {
        self != Self::INFINITY && self != Self::NEG_INFINITY
    }
}

macro_rules! impl_num_float {
    ($t:ty) => {
        impl Num for $t {
            const ZERO: Self = 0.0;
            const INFINITY: Self = <$t>::INFINITY;
            const NEG_INFINITY: Self = <$t>::NEG_INFINITY;

            fn from_i32(v: i32) -> Self {
                v as $t
            }
        }
    };
}

impl_num_float!(f32);
impl_num_float!(f64);

/// Wraps a signed fixed-point type from the `fixed` crate so it can be used
/// as the [`Num`] representation for widths/ratios/demerits.
///
/// `+∞`/`-∞` are represented by the type's `MAX`/`MIN` values (the usual
/// convention for an "infinite stretch" glue value in fixed-point layout
/// code). Arithmetic on these saturating sentinels is only ever used for
/// comparisons in this crate (never added to a finite value), so there is
/// no silent wraparound in practice.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Fixed<F>(pub F);

impl<F: fixed::traits::FixedSigned> Add for Fixed<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Fixed(self.0 + rhs.0)
    }
}

impl<F: fixed::traits::FixedSigned> Sub for Fixed<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Fixed(self.0 - rhs.0)
    }
}

impl<F: fixed::traits::FixedSigned> Mul for Fixed<F> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Fixed(self.0 * rhs.0)
    }
}

impl<F: fixed::traits::FixedSigned> Div for Fixed<F> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Fixed(self.0 / rhs.0)
    }
}

impl<F: fixed::traits::FixedSigned> Neg for Fixed<F> {
    type Output = Self;
    fn neg(self) -> Self {
        Fixed(-self.0)
    }
}

impl<F: fixed::traits::FixedSigned> AddAssign for Fixed<F> {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl<F: fixed::traits::FixedSigned> Num for Fixed<F> {
    const ZERO: Self = Fixed(F::ZERO);
    const INFINITY: Self = Fixed(F::MAX);
    const NEG_INFINITY: Self = Fixed(F::MIN);

    fn from_i32(v: i32) -> Self {
        Fixed(F::from_num(v))
    }
}
