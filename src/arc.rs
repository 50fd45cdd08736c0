use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::Error;

/// A directed, weighted edge of the actor graph.
///
/// The weight is the interest rate charged for borrowing along this arc; it is the search cost.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(
    try_from = "RawArc<AccountId, Amt>",
    bound(deserialize = "AccountId: PartialEq + Deserialize<'de>, \
                    Amt: Amount + Deserialize<'de>")
)]
pub struct Arc<AccountId, Amt> {
    source: AccountId,
    target: AccountId,
    interest_rate: Amt,
}

impl<AccountId, Amt> Arc<AccountId, Amt>
where
    AccountId: PartialEq,
    Amt: Amount,
{
    pub fn new(source: AccountId, target: AccountId, interest_rate: Amt) -> Result<Self, Error> {
        if source == target {
            Err(Error::SelfLoop)
        } else if !interest_rate.is_non_negative() {
            Err(Error::InvalidWeight)
        } else {
            Ok(Self {
                source,
                target,
                interest_rate,
            })
        }
    }
}

impl<AccountId, Amt: Copy> Arc<AccountId, Amt> {
    pub fn source(&self) -> &AccountId {
        &self.source
    }

    pub fn target(&self) -> &AccountId {
        &self.target
    }

    pub fn interest_rate(&self) -> Amt {
        self.interest_rate
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RawArc<AccountId, Amt> {
    pub source: AccountId,
    pub target: AccountId,
    pub interest_rate: Amt,
}

impl<AccountId, Amt> TryFrom<RawArc<AccountId, Amt>> for Arc<AccountId, Amt>
where
    AccountId: PartialEq,
    Amt: Amount,
{
    type Error = Error;

    fn try_from(a: RawArc<AccountId, Amt>) -> Result<Self, Self::Error> {
        Self::new(a.source, a.target, a.interest_rate)
    }
}

impl<AccountId, Amt> From<Arc<AccountId, Amt>> for RawArc<AccountId, Amt> {
    fn from(a: Arc<AccountId, Amt>) -> Self {
        Self {
            source: a.source,
            target: a.target,
            interest_rate: a.interest_rate,
        }
    }
}
