use alloc::vec::Vec;

use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// A single lender's contribution to a loan request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loan<AccountId, Amt> {
    lender: AccountId,
    amount: Amt,
    interest_rate: Amt,
}

impl<AccountId, Amt: Copy> Loan<AccountId, Amt> {
    pub fn new(lender: AccountId, amount: Amt, interest_rate: Amt) -> Self {
        Self {
            lender,
            amount,
            interest_rate,
        }
    }

    pub fn lender(&self) -> &AccountId {
        &self.lender
    }

    /// The amount borrowed from this lender.
    pub fn amount(&self) -> Amt {
        self.amount
    }

    /// The cumulative interest rate along the cheapest path to this lender.
    pub fn interest_rate(&self) -> Amt {
        self.interest_rate
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum LoanStatus {
    /// satisfied
    Satisfied,
    /// partially satisfied
    PartiallySatisfied,
}

/// The outcome of a loan search: the lenders in the order they were found, cheapest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanResult<AccountId, Amt> {
    status: LoanStatus,
    loans: Vec<Loan<AccountId, Amt>>,
    requested: Amt,
    borrowed: Amt,
}

impl<AccountId, Amt: Copy> LoanResult<AccountId, Amt> {
    pub(crate) fn new(
        status: LoanStatus,
        loans: Vec<Loan<AccountId, Amt>>,
        requested: Amt,
        borrowed: Amt,
    ) -> Self {
        Self {
            status,
            loans,
            requested,
            borrowed,
        }
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn is_satisfied(&self) -> bool {
        self.status == LoanStatus::Satisfied
    }

    pub fn loans(&self) -> &[Loan<AccountId, Amt>] {
        &self.loans
    }

    pub fn into_loans(self) -> Vec<Loan<AccountId, Amt>> {
        self.loans
    }

    pub fn requested(&self) -> Amt {
        self.requested
    }

    /// The total amount borrowed; equals `requested` iff the result is satisfied.
    pub fn borrowed(&self) -> Amt {
        self.borrowed
    }
}
