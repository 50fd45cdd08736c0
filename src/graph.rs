use alloc::collections::btree_map::{BTreeMap, Entry};
use alloc::vec::Vec;

use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::actor::Actor;
use crate::amount::Amount;
use crate::arc::Arc;
use crate::error::Error;
use crate::id::Id;

/// An append-only directed graph of actors connected by interest-bearing arcs.
///
/// Actors are stored as petgraph nodes and arcs as petgraph edges, so parallel arcs between the
/// same pair of actors are kept as distinct edges. Node indices are dense (nothing is ever
/// removed), which lets a search keep its bookkeeping in plain vectors.
///
/// petgraph walks a node's edges newest first, so each actor also keeps its outgoing edge
/// indices in the order the arcs were added.
#[derive(Clone, Debug)]
pub struct ActorGraph<AccountId, Amt> {
    graph: Graph<Actor<AccountId, Amt>, Arc<AccountId, Amt>>,
    index: BTreeMap<AccountId, NodeIndex>,
    adjacency: Vec<Vec<EdgeIndex>>,
}

impl<AccountId, Amt> Default for ActorGraph<AccountId, Amt> {
    fn default() -> Self {
        Self {
            graph: Graph::new(),
            index: BTreeMap::new(),
            adjacency: Vec::new(),
        }
    }
}

impl<AccountId, Amt> ActorGraph<AccountId, Amt>
where
    AccountId: Id,
    Amt: Amount,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an actor with its lendable potential.
    pub fn add_actor(&mut self, id: AccountId, potential: Amt) -> Result<(), Error> {
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateActor);
        }
        self.insert_actor(Actor::new(id, potential)?)
    }

    /// Registers an already validated actor.
    pub fn insert_actor(&mut self, actor: Actor<AccountId, Amt>) -> Result<(), Error> {
        match self.index.entry(actor.id().clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateActor),
            Entry::Vacant(entry) => {
                entry.insert(self.graph.add_node(actor));
                self.adjacency.push(Vec::new());
                Ok(())
            }
        }
    }

    /// Adds a directed arc between two actors that are already present in the graph.
    pub fn add_arc(
        &mut self,
        source: AccountId,
        target: AccountId,
        interest_rate: Amt,
    ) -> Result<(), Error> {
        self.endpoints(&source, &target)?;
        self.insert_arc(Arc::new(source, target, interest_rate)?)
    }

    /// Adds an already validated arc.
    pub fn insert_arc(&mut self, arc: Arc<AccountId, Amt>) -> Result<(), Error> {
        let (source, target) = self.endpoints(arc.source(), arc.target())?;
        let edge = self.graph.add_edge(source, target, arc);
        self.adjacency[source.index()].push(edge);
        Ok(())
    }

    /// The arcs leaving `id` in the order they were added; empty if the actor has none or is not
    /// in the graph.
    pub fn outgoing_arcs<'a>(
        &'a self,
        id: &AccountId,
    ) -> impl Iterator<Item = &'a Arc<AccountId, Amt>> + 'a {
        self.index
            .get(id)
            .into_iter()
            .flat_map(move |&ix| self.adjacency[ix.index()].iter().map(|&e| &self.graph[e]))
    }

    pub fn actor(&self, id: &AccountId) -> Option<&Actor<AccountId, Amt>> {
        self.index.get(id).map(|&ix| &self.graph[ix])
    }

    pub fn contains_actor(&self, id: &AccountId) -> bool {
        self.index.contains_key(id)
    }

    /// All actors in insertion order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor<AccountId, Amt>> + '_ {
        self.graph.node_indices().map(move |ix| &self.graph[ix])
    }

    pub fn actor_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn index_of(&self, id: &AccountId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn actor_at(&self, ix: NodeIndex) -> &Actor<AccountId, Amt> {
        &self.graph[ix]
    }

    /// Potentials indexed by node index, used to seed per-query capacity bookkeeping.
    pub(crate) fn potentials(&self) -> Vec<Amt> {
        self.actors().map(Actor::potential).collect()
    }

    pub(crate) fn successors(&self, ix: NodeIndex) -> impl Iterator<Item = (NodeIndex, Amt)> + '_ {
        let edges = self.graph.raw_edges();
        self.adjacency[ix.index()].iter().map(move |&e| {
            let edge = &edges[e.index()];
            (edge.target(), edge.weight.interest_rate())
        })
    }

    fn endpoints(
        &self,
        source: &AccountId,
        target: &AccountId,
    ) -> Result<(NodeIndex, NodeIndex), Error> {
        match (self.index_of(source), self.index_of(target)) {
            (Some(s), Some(t)) => Ok((s, t)),
            _ => Err(Error::UnknownActor),
        }
    }
}
