use alloc::string::String;
use core::fmt::Debug;

/// A trait representing an actor identifier.
pub trait Id: Clone + Ord + Debug {}

impl Id for i32 {}

impl Id for u32 {}

impl Id for u64 {}

impl Id for usize {}

impl Id for String {}

impl Id for &'static str {}
