#![no_std]
#![deny(
    warnings,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod actor;
pub mod amount;
pub mod arc;
pub mod error;
pub mod graph;
pub mod heap;
pub mod id;
pub mod impls;
pub mod loan;

pub use crate::actor::{Actor, RawActor};
pub use crate::amount::Amount;
pub use crate::arc::{Arc, RawArc};
pub use crate::error::Error;
pub use crate::graph::ActorGraph;
pub use crate::heap::{BinaryHeap, FibonacciHeap, Handle, PriorityQueue};
pub use crate::id::Id;
pub use crate::impls::default::{BinaryHeapLoanFinder, DefaultLoanFinder, FibonacciHeapLoanFinder};
pub use crate::loan::{Loan, LoanResult, LoanStatus};

/// The most cost-effective loan search.
///
/// Starting from a borrower, collect lenders in order of increasing cumulative interest rate
/// (the sum of arc rates along the cheapest path) until the requested potential is covered or
/// nothing affordable is left.
pub trait LoanFinder {
    type AccountId;
    type Amount;
    type Error;

    /// Run the search. Running out of reachable, affordable potential is reported through the
    /// result status, not as an error.
    fn find_lenders(
        &self,
        start: &Self::AccountId,
        requested_potential: Self::Amount,
        maximum_affordable_interest_rate: Self::Amount,
    ) -> Result<LoanResult<Self::AccountId, Self::Amount>, Self::Error>;

    /// Verify conservation and affordability of a result produced by `find_lenders`.
    fn check(
        &self,
        result: &LoanResult<Self::AccountId, Self::Amount>,
        maximum_affordable_interest_rate: Self::Amount,
    ) -> Result<(), Self::Error>;
}
