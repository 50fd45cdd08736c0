use displaydoc::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Error {
    /// Actor is already present in the graph
    DuplicateActor,
    /// Arc references an actor that is not present in the graph
    UnknownActor,
    /// Invalid arc where source and target are the same actor
    SelfLoop,
    /// Invalid actor potential, expected non-negative value
    InvalidCapacity,
    /// Invalid arc interest rate, expected non-negative value
    InvalidWeight,
    /// Invalid query, expected a known start actor and non-negative amounts
    InvalidQuery,
    /// Decrease-key called with a priority that is not strictly smaller
    PriorityIncrease,
    /// Handle does not refer to an item currently in the queue
    StaleHandle,
    /// Loan result violates conservation or affordability
    InconsistentResult,
}
