use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::Error;

/// A node of the actor graph, i.e. a potential lender or borrower.
///
/// Two actors are equal iff their identifiers are equal, regardless of potential.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(
    try_from = "RawActor<AccountId, Amt>",
    bound(deserialize = "AccountId: Deserialize<'de>, Amt: Amount + Deserialize<'de>")
)]
pub struct Actor<AccountId, Amt> {
    id: AccountId,
    potential: Amt,
}

impl<AccountId, Amt> Actor<AccountId, Amt>
where
    Amt: Amount,
{
    pub fn new(id: AccountId, potential: Amt) -> Result<Self, Error> {
        if potential.is_non_negative() {
            Ok(Self { id, potential })
        } else {
            Err(Error::InvalidCapacity)
        }
    }
}

impl<AccountId, Amt: Copy> Actor<AccountId, Amt> {
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// The maximum amount this actor can lend.
    pub fn potential(&self) -> Amt {
        self.potential
    }
}

impl<AccountId: PartialEq, Amt> PartialEq for Actor<AccountId, Amt> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<AccountId: Eq, Amt> Eq for Actor<AccountId, Amt> {}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RawActor<AccountId, Amt> {
    pub id: AccountId,
    pub potential: Amt,
}

impl<AccountId, Amt> TryFrom<RawActor<AccountId, Amt>> for Actor<AccountId, Amt>
where
    Amt: Amount,
{
    type Error = Error;

    fn try_from(a: RawActor<AccountId, Amt>) -> Result<Self, Self::Error> {
        Self::new(a.id, a.potential)
    }
}

impl<AccountId, Amt> From<Actor<AccountId, Amt>> for RawActor<AccountId, Amt> {
    fn from(a: Actor<AccountId, Amt>) -> Self {
        Self {
            id: a.id,
            potential: a.potential,
        }
    }
}
