use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use itertools::Itertools;
use petgraph::graph::NodeIndex;

use crate::amount::Amount;
use crate::error::Error;
use crate::graph::ActorGraph;
use crate::heap::{BinaryHeap, FibonacciHeap, Handle, PriorityQueue};
use crate::id::Id;
use crate::loan::{Loan, LoanResult, LoanStatus};
use crate::LoanFinder;

pub type BinaryHeapLoanFinder<'g, AccountId, Amt> =
    DefaultLoanFinder<'g, AccountId, Amt, BinaryHeap<NodeIndex, Amt>>;

pub type FibonacciHeapLoanFinder<'g, AccountId, Amt> =
    DefaultLoanFinder<'g, AccountId, Amt, FibonacciHeap<NodeIndex, Amt>>;

/// Best-first loan search over a borrowed actor graph, generic over the priority queue `Q`.
///
/// Every query builds a fresh `Q` and its own bookkeeping, so one finder (or many finders
/// sharing the same graph) can serve any number of queries.
pub struct DefaultLoanFinder<'g, AccountId, Amt, Q> {
    graph: &'g ActorGraph<AccountId, Amt>,
    _phantom: PhantomData<fn() -> Q>,
}

impl<'g, AccountId, Amt, Q> DefaultLoanFinder<'g, AccountId, Amt, Q> {
    pub fn new(graph: &'g ActorGraph<AccountId, Amt>) -> Self {
        Self {
            graph,
            _phantom: Default::default(),
        }
    }
}

impl<'g, AccountId, Amt, Q> Clone for DefaultLoanFinder<'g, AccountId, Amt, Q> {
    fn clone(&self) -> Self {
        Self::new(self.graph)
    }
}

/// Per-query frontier: tentative costs, queue handles, the settled set and the potential still
/// available at each actor, all indexed by node index.
struct SearchState<Amt, Q> {
    queue: Q,
    tentative: Vec<Option<Amt>>,
    handles: Vec<Option<Handle>>,
    visited: Vec<bool>,
    remaining: Vec<Amt>,
}

impl<Amt, Q> SearchState<Amt, Q>
where
    Amt: Amount,
    Q: PriorityQueue<Item = NodeIndex, Priority = Amt> + Default,
{
    fn new<AccountId: Id>(graph: &ActorGraph<AccountId, Amt>) -> Self {
        let n = graph.actor_count();
        Self {
            queue: Q::default(),
            tentative: vec![None; n],
            handles: vec![None; n],
            visited: vec![false; n],
            remaining: graph.potentials(),
        }
    }

    /// Offers `cost` as a path cost to `v`: queues `v` on first sighting, lowers its key on a
    /// strict improvement, and ignores settled actors.
    fn relax(&mut self, v: NodeIndex, cost: Amt) -> Result<(), Error> {
        let i = v.index();
        if self.visited[i] {
            return Ok(());
        }
        match (self.tentative[i], self.handles[i]) {
            (Some(current), Some(handle)) => {
                if cost < current {
                    self.tentative[i] = Some(cost);
                    self.queue.decrease_key(handle, cost)?;
                }
            }
            _ => {
                self.tentative[i] = Some(cost);
                self.handles[i] = Some(self.queue.insert(v, cost));
            }
        }
        Ok(())
    }

    /// Pops the cheapest frontier actor and marks it visited.
    fn settle(&mut self) -> Option<(NodeIndex, Amt)> {
        let (u, cost) = self.queue.extract_min()?;
        self.visited[u.index()] = true;
        Some((u, cost))
    }

    /// Takes up to `wanted` from the potential left at `u`.
    fn draw(&mut self, u: NodeIndex, wanted: Amt) -> Amt {
        let available = &mut self.remaining[u.index()];
        let amount = if *available < wanted {
            *available
        } else {
            wanted
        };
        *available -= amount;
        amount
    }
}

impl<'g, AccountId, Amt, Q> LoanFinder for DefaultLoanFinder<'g, AccountId, Amt, Q>
where
    AccountId: Id,
    Amt: Amount,
    Q: PriorityQueue<Item = NodeIndex, Priority = Amt> + Default,
{
    type AccountId = AccountId;
    type Amount = Amt;
    type Error = Error;

    fn find_lenders(
        &self,
        start: &AccountId,
        requested_potential: Amt,
        maximum_affordable_interest_rate: Amt,
    ) -> Result<LoanResult<AccountId, Amt>, Self::Error> {
        let origin = self.graph.index_of(start).ok_or(Error::InvalidQuery)?;
        if !requested_potential.is_non_negative()
            || !maximum_affordable_interest_rate.is_non_negative()
        {
            return Err(Error::InvalidQuery);
        }

        let mut state = SearchState::<Amt, Q>::new(self.graph);
        state.relax(origin, Amt::zero())?;

        let mut loans = Vec::new();
        let mut borrowed = Amt::zero();
        let mut covered = false;

        while !covered && borrowed < requested_potential {
            let Some((u, cost)) = state.settle() else {
                log::trace!("frontier exhausted");
                break;
            };

            // the queue is min-ordered, so nothing cheaper is left
            if cost > maximum_affordable_interest_rate {
                log::trace!("cheapest rate {cost} exceeds {maximum_affordable_interest_rate}");
                break;
            }

            if u != origin {
                let outstanding = requested_potential - borrowed;
                let amount = state.draw(u, outstanding);
                covered = !(amount < outstanding);
                if amount > Amt::zero() {
                    borrowed += amount;
                    let lender = self.graph.actor_at(u).id().clone();
                    log::trace!("{lender:?} lends {amount} at {cost}");
                    loans.push(Loan::new(lender, amount, cost));
                }
            }

            // `cost <= ceiling` here, so the headroom cannot underflow; arcs past it are skipped
            // rather than summed
            let headroom = maximum_affordable_interest_rate - cost;
            for (v, rate) in self.graph.successors(u) {
                if rate <= headroom {
                    state.relax(v, cost + rate)?;
                }
            }
        }

        let status = if covered || !(borrowed < requested_potential) {
            LoanStatus::Satisfied
        } else {
            LoanStatus::PartiallySatisfied
        };

        log::debug!(
            "{start:?} borrows {borrowed} of {requested_potential} ({status}) from [{}]",
            loans
                .iter()
                .format_with(", ", |l, f| f(&format_args!("{:?}", l.lender())))
        );

        Ok(LoanResult::new(
            status,
            loans,
            requested_potential,
            borrowed,
        ))
    }

    fn check(
        &self,
        result: &LoanResult<AccountId, Amt>,
        maximum_affordable_interest_rate: Amt,
    ) -> Result<(), Self::Error> {
        let loans = result.loans();
        let requested = result.requested();
        let borrowed = result.borrowed();

        // Replay the draws: every loan fits within what was still outstanding, and the running
        // total is accumulated in the same order as the search, so it must match `borrowed`.
        let mut total = Amt::zero();
        let mut within_outstanding = true;
        let mut last_covers = false;
        for loan in loans {
            let outstanding = requested - total;
            within_outstanding &= Amt::zero() < outstanding && loan.amount() <= outstanding;
            last_covers = !(loan.amount() < outstanding);
            total += loan.amount();
        }

        // Satisfied iff the closing loan covered the outstanding amount or the total reached
        // the request; floating-point totals may then differ from `requested` in the last place
        let covered = last_covers || !(borrowed < requested);
        let status_ok = match result.status() {
            LoanStatus::Satisfied => covered,
            LoanStatus::PartiallySatisfied => !covered,
        };

        // every loan is affordable, positive and within the lender's potential
        let loans_ok = loans.iter().all(|l| {
            l.interest_rate() <= maximum_affordable_interest_rate
                && l.amount() > Amt::zero()
                && self
                    .graph
                    .actor(l.lender())
                    .map_or(false, |a| l.amount() <= a.potential())
        });

        // each actor lends at most once
        let distinct = loans.iter().map(Loan::lender).collect::<BTreeSet<_>>().len() == loans.len();

        let cheapest = loans.first().map(Loan::interest_rate);
        let dearest = loans.last().map(Loan::interest_rate);

        log::debug!("  num of lenders: {}", loans.len());
        log::debug!("       requested: {requested}");
        log::debug!("        borrowed: {borrowed}");
        log::debug!("    sum of loans: {total}");
        log::debug!("   cheapest rate: {cheapest:?}");
        log::debug!("    dearest rate: {dearest:?}");
        log::debug!("    maximum rate: {maximum_affordable_interest_rate}");

        if status_ok && loans_ok && distinct && within_outstanding && total == borrowed {
            Ok(())
        } else {
            Err(Error::InconsistentResult)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{BinaryHeapLoanFinder, FibonacciHeapLoanFinder};
    use crate::error::Error;
    use crate::graph::ActorGraph;
    use crate::id::Id;
    use crate::loan::{Loan, LoanResult, LoanStatus};
    use crate::{Amount, LoanFinder};

    /// Runs the query against both backends, checks they agree and that the result is consistent.
    fn find<AccountId: Id, Amt: Amount>(
        graph: &ActorGraph<AccountId, Amt>,
        start: AccountId,
        requested: Amt,
        maximum_rate: Amt,
    ) -> LoanResult<AccountId, Amt> {
        let binary = BinaryHeapLoanFinder::new(graph);
        let fibonacci = FibonacciHeapLoanFinder::new(graph);
        let b = binary.find_lenders(&start, requested, maximum_rate).unwrap();
        let f = fibonacci
            .find_lenders(&start, requested, maximum_rate)
            .unwrap();
        assert_eq!(b, f);
        binary.check(&b, maximum_rate).unwrap();
        b
    }

    fn abc() -> ActorGraph<&'static str, f64> {
        let mut g = ActorGraph::new();
        g.add_actor("A", 0.0).unwrap();
        g.add_actor("B", 100.0).unwrap();
        g.add_actor("C", 100.0).unwrap();
        g.add_arc("A", "B", 0.01).unwrap();
        g.add_arc("A", "C", 0.05).unwrap();
        g
    }

    #[test]
    fn borrows_cheapest_first_and_clips_last_loan() {
        let g = abc();
        let result = find(&g, "A", 120.0, 0.06);
        assert_eq!(result.status(), LoanStatus::Satisfied);
        assert_eq!(
            result.loans(),
            [Loan::new("B", 100.0, 0.01), Loan::new("C", 20.0, 0.05)]
        );
        assert_eq!(result.borrowed(), 120.0);
    }

    #[test]
    fn reports_insufficient_liquidity() {
        let g = abc();
        let result = find(&g, "A", 250.0, 0.06);
        assert_eq!(result.status(), LoanStatus::PartiallySatisfied);
        assert_eq!(result.borrowed(), 200.0);
        assert_eq!(
            result.loans(),
            [Loan::new("B", 100.0, 0.01), Loan::new("C", 100.0, 0.05)]
        );
    }

    #[test]
    fn stops_at_the_affordable_rate() {
        let g = abc();
        let result = find(&g, "A", 120.0, 0.03);
        assert_eq!(result.status(), LoanStatus::PartiallySatisfied);
        assert_eq!(result.loans(), [Loan::new("B", 100.0, 0.01)]);

        // the ceiling is inclusive
        let result = find(&g, "A", 120.0, 0.05);
        assert!(result.is_satisfied());
    }

    /// Rates in basis points so that path sums are exact.
    fn chain() -> ActorGraph<u32, u64> {
        let mut g = ActorGraph::new();
        for (id, potential) in [(0, 500), (1, 100), (2, 0), (3, 50), (4, 100)] {
            g.add_actor(id, potential).unwrap();
        }
        g.add_arc(0, 1, 10).unwrap();
        g.add_arc(0, 4, 90).unwrap();
        g.add_arc(1, 2, 5).unwrap();
        g.add_arc(2, 3, 5).unwrap();
        g.add_arc(1, 0, 1).unwrap();
        g.add_arc(3, 0, 1).unwrap();
        g
    }

    #[test]
    fn sums_rates_along_paths_and_skips_empty_actors() {
        let g = chain();
        let result = find(&g, 0, 200, 100);
        assert!(result.is_satisfied());
        assert_eq!(
            result.loans(),
            [
                Loan::new(1, 100, 10),
                Loan::new(3, 50, 20),
                Loan::new(4, 50, 90)
            ]
        );
    }

    #[test]
    fn decrease_key_finds_cheaper_indirect_path() {
        let mut g = chain();
        // 0 -> 4 costs 90 directly but only 10 + 5 + 5 + 1 = 21 via 3
        g.add_arc(3, 4, 1).unwrap();
        let result = find(&g, 0, 300, 100);
        assert_eq!(
            result.loans(),
            [
                Loan::new(1, 100, 10),
                Loan::new(3, 50, 20),
                Loan::new(4, 100, 21)
            ]
        );
        assert_eq!(result.status(), LoanStatus::PartiallySatisfied);
        assert_eq!(result.borrowed(), 250);
    }

    #[test]
    fn never_borrows_from_the_start_actor() {
        let g = chain();
        let result = find(&g, 1, 1_000, 1_000);
        assert_eq!(result.status(), LoanStatus::PartiallySatisfied);
        assert!(result.loans().iter().all(|l| *l.lender() != 1));
        assert_eq!(result.borrowed(), 650);
    }

    #[test]
    fn zero_request_is_trivially_satisfied() {
        let g = abc();
        let result = find(&g, "A", 0.0, 0.0);
        assert!(result.is_satisfied());
        assert!(result.loans().is_empty());
    }

    #[test]
    fn unreachable_capacity_is_not_an_error() {
        let g = abc();
        let result = find(&g, "B", 10.0, 1.0);
        assert_eq!(result.status(), LoanStatus::PartiallySatisfied);
        assert_eq!(result.borrowed(), 0.0);
    }

    #[test]
    fn rejects_invalid_queries() {
        let g = abc();
        let finder = FibonacciHeapLoanFinder::new(&g);
        assert_eq!(
            finder.find_lenders(&"Z", 1.0, 1.0),
            Err(Error::InvalidQuery)
        );
        assert_eq!(
            finder.find_lenders(&"A", -1.0, 1.0),
            Err(Error::InvalidQuery)
        );
        assert_eq!(
            finder.find_lenders(&"A", 1.0, f64::NAN),
            Err(Error::InvalidQuery)
        );
    }

    #[test]
    fn queries_are_idempotent_and_leave_the_graph_untouched() {
        let g = abc();
        let finder = BinaryHeapLoanFinder::new(&g);
        let first = finder.find_lenders(&"A", 150.0, 1.0).unwrap();
        let second = finder.clone().find_lenders(&"A", 150.0, 1.0).unwrap();
        assert_eq!(first, second);

        let potentials: Vec<_> = g.actors().map(|a| a.potential()).collect();
        assert_eq!(potentials, vec![0.0, 100.0, 100.0]);
    }

    #[test]
    fn saturating_rates_do_not_overflow_path_costs() {
        let mut g = ActorGraph::new();
        for (id, potential) in [(0u32, 0u64), (1, 5), (2, 5)] {
            g.add_actor(id, potential).unwrap();
        }
        g.add_arc(0, 1, u64::MAX).unwrap();
        g.add_arc(1, 2, 1).unwrap();

        // 2 sits at MAX + 1, past any ceiling
        let result = find(&g, 0, 10, u64::MAX);
        assert_eq!(result.status(), LoanStatus::PartiallySatisfied);
        assert_eq!(result.loans(), [Loan::new(1, 5, u64::MAX)]);

        let result = find(&g, 0, 10, u64::MAX - 1);
        assert!(result.loans().is_empty());
    }

    #[test]
    fn borrowed_is_the_sum_of_float_loans() {
        let mut g = ActorGraph::new();
        g.add_actor("A", 0.0).unwrap();
        g.add_actor("B", 49.54).unwrap();
        g.add_actor("C", 100.0).unwrap();
        g.add_arc("A", "B", 0.01).unwrap();
        g.add_arc("A", "C", 0.05).unwrap();

        let result = find(&g, "A", 117.17, 0.06);
        assert_eq!(result.status(), LoanStatus::Satisfied);
        assert_eq!(result.loans()[0], Loan::new("B", 49.54, 0.01));
        assert_eq!(result.loans()[1].amount(), 117.17 - 49.54);

        let total: f64 = result.loans().iter().map(|l| l.amount()).sum();
        assert_eq!(result.borrowed(), total);
        // at most a rounding step away from the request
        let tolerance = 117.17 * f64::EPSILON;
        assert!(total <= 117.17 + tolerance && total >= 117.17 - tolerance);
    }

    #[test]
    fn equal_costs_are_settled_in_arc_order() {
        let mut g = ActorGraph::new();
        for (id, potential) in [(0u32, 0u64), (1, 100), (2, 100)] {
            g.add_actor(id, potential).unwrap();
        }
        g.add_arc(0, 2, 5).unwrap();
        g.add_arc(0, 1, 5).unwrap();

        let result = find(&g, 0, 50, 10);
        assert_eq!(result.loans(), [Loan::new(2, 50, 5)]);
    }

    #[test]
    fn check_rejects_results_that_do_not_add_up() {
        let g = abc();
        let finder = FibonacciHeapLoanFinder::new(&g);

        // the second loan exceeds what was still outstanding
        let over_lent = LoanResult::new(
            LoanStatus::Satisfied,
            vec![Loan::new("B", 100.0, 0.01), Loan::new("C", 100.0, 0.05)],
            120.0,
            120.0,
        );
        assert_eq!(
            finder.check(&over_lent, 0.06),
            Err(Error::InconsistentResult)
        );

        let misreported = LoanResult::new(
            LoanStatus::PartiallySatisfied,
            vec![Loan::new("B", 100.0, 0.01)],
            120.0,
            90.0,
        );
        assert_eq!(
            finder.check(&misreported, 0.06),
            Err(Error::InconsistentResult)
        );

        let honest = LoanResult::new(
            LoanStatus::PartiallySatisfied,
            vec![Loan::new("B", 100.0, 0.01)],
            120.0,
            100.0,
        );
        assert_eq!(finder.check(&honest, 0.06), Ok(()));
    }

    #[test]
    fn check_rejects_inconsistent_results() {
        let g = abc();
        let finder = BinaryHeapLoanFinder::new(&g);

        let unaffordable = LoanResult::new(
            LoanStatus::PartiallySatisfied,
            vec![Loan::new("C", 20.0, 0.05)],
            120.0,
            20.0,
        );
        assert_eq!(
            finder.check(&unaffordable, 0.01),
            Err(Error::InconsistentResult)
        );

        let duplicated = LoanResult::new(
            LoanStatus::Satisfied,
            vec![Loan::new("B", 60.0, 0.01), Loan::new("B", 60.0, 0.01)],
            120.0,
            120.0,
        );
        assert_eq!(
            finder.check(&duplicated, 0.06),
            Err(Error::InconsistentResult)
        );

        let wrong_status = LoanResult::new(
            LoanStatus::Satisfied,
            vec![Loan::new("B", 100.0, 0.01)],
            120.0,
            100.0,
        );
        assert_eq!(
            finder.check(&wrong_status, 0.06),
            Err(Error::InconsistentResult)
        );
    }
}
