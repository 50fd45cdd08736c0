use core::fmt::{Debug, Display};
use core::ops::{Add, AddAssign, Sub, SubAssign};

use num_traits::Zero;

/// A trait representing a potential or an interest rate.
///
/// Only a partial order is required so that floating point types qualify. Values that do not
/// compare (i.e. NaN) are rejected wherever they enter the graph or a query.
pub trait Amount:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + SubAssign
    + Zero
    + Debug
    + Display
    + Default
{
    /// `true` if the value is zero or positive, `false` for negative values and NaN.
    fn is_non_negative(&self) -> bool {
        *self >= Self::zero()
    }
}

impl Amount for f64 {}

impl Amount for f32 {}

impl Amount for i32 {}

impl Amount for i64 {}

impl Amount for u32 {}

impl Amount for u64 {}
