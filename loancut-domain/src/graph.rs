//! The financial multigraph: parties as arena-allocated nodes, loan
//! contracts as directed parallel edges.
//!
//! Nodes and contracts are addressed by dense ids into arenas owned by the
//! graph; nothing points back at the graph, and the mirrored `out`/`in`
//! incidence is kept in step on every mutation. Iteration order is
//! insertion order throughout — the solver relies on it for its row and
//! column layout.

use std::fmt::{self, Write as _};

use fxhash::FxHashMap;
use indexmap::IndexMap;
use thiserror::Error;

use crate::assignment::{DebtCutAssignment, TimeAssignment};
use crate::contract::{Contract, ContractError};
use crate::epsilon::Epsilon;
use crate::ports::{CutSolution, DebtCutFinder, SolveError};

/// Index of a node in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Index of a contract in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl ContractId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("a node named '{name}' already exists in graph '{graph}'")]
    DuplicateNode { graph: String, name: String },
    #[error("a contract named '{name}' already exists in graph '{graph}'")]
    DuplicateContract { graph: String, name: String },
    #[error("node id {0} does not belong to this graph")]
    UnknownNode(usize),
    #[error("a contract from '{0}' to itself is not allowed")]
    SelfLoop(String),
    #[error("no payment time for contract '{contract}' received by '{node}'")]
    MissingPaymentTime { node: String, contract: String },
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// A party in the graph.
///
/// `out` maps each debtor to the contracts extended to it; `inc` mirrors
/// the relation from the receiving side. Both sides list the same
/// contract ids in the same order.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    out: IndexMap<NodeId, Vec<ContractId>>,
    inc: IndexMap<NodeId, Vec<ContractId>>,
    maximum_timestamp: f64,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            out: IndexMap::new(),
            inc: IndexMap::new(),
            maximum_timestamp: f64::NEG_INFINITY,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Largest timestamp among incident contracts; `-inf` when isolated.
    pub fn maximum_timestamp(&self) -> f64 {
        self.maximum_timestamp
    }

    /// Debtor nodes in first-contract order.
    pub fn debtors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.out.keys().copied()
    }

    /// Lender nodes in first-contract order.
    pub fn lenders(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inc.keys().copied()
    }

    /// Contracts this node extends to `debtor`.
    pub fn contracts_to(&self, debtor: NodeId) -> &[ContractId] {
        self.out.get(&debtor).map_or(&[], Vec::as_slice)
    }

    /// All outgoing contracts, grouped by debtor in insertion order.
    pub fn outgoing(&self) -> impl Iterator<Item = ContractId> + '_ {
        self.out.values().flatten().copied()
    }

    /// All incoming contracts, grouped by lender in insertion order.
    pub fn incoming(&self) -> impl Iterator<Item = ContractId> + '_ {
        self.inc.values().flatten().copied()
    }

    pub fn outgoing_with_debtors(&self) -> impl Iterator<Item = (NodeId, ContractId)> + '_ {
        self.out
            .iter()
            .flat_map(|(&debtor, list)| list.iter().map(move |&c| (debtor, c)))
    }
}

/// Named container of nodes and contracts.
pub struct Graph {
    name: String,
    epsilon: Epsilon,
    nodes: Vec<Node>,
    node_ids: FxHashMap<String, NodeId>,
    contracts: Vec<Contract>,
    contract_ids: FxHashMap<String, ContractId>,
    edge_count: usize,
    contract_count: usize,
    maximum_timestamp: f64,
    finder: Option<Box<dyn DebtCutFinder>>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edge_count)
            .field("contracts", &self.contract_count)
            .finish()
    }
}

impl Graph {
    /// An empty graph capturing the process-wide epsilon current now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            epsilon: Epsilon::current(),
            nodes: Vec::new(),
            node_ids: FxHashMap::default(),
            contracts: Vec::new(),
            contract_ids: FxHashMap::default(),
            edge_count: 0,
            contract_count: 0,
            maximum_timestamp: f64::NEG_INFINITY,
            finder: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn epsilon(&self) -> Epsilon {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: Epsilon) {
        self.epsilon = epsilon;
    }

    /// Adds a node; its incidence, if any, is discarded.
    pub fn add(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        if self.node_ids.contains_key(node.name()) {
            return Err(GraphError::DuplicateNode {
                graph: self.name.clone(),
                name: node.name().to_string(),
            });
        }
        node.out.clear();
        node.inc.clear();
        let id = NodeId(self.nodes.len());
        self.node_ids.insert(node.name().to_string(), id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Convenience for `add(Node::new(name))`.
    pub fn add_node(&mut self, name: impl Into<String>) -> Result<NodeId, GraphError> {
        self.add(Node::new(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_ids.contains_key(name)
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_ids.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Nodes in insertion order — the solver's row order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ordered (lender, debtor) pairs carrying at least one contract.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contract_count(&self) -> usize {
        self.contract_count
    }

    /// Largest contract timestamp ever admitted. Not lowered by removals.
    pub fn maximum_timestamp(&self) -> f64 {
        self.maximum_timestamp
    }

    pub fn contract(&self, id: ContractId) -> Option<&Contract> {
        self.contracts.get(id.0)
    }

    pub fn contract_id(&self, name: &str) -> Option<ContractId> {
        self.contract_ids.get(name).copied()
    }

    fn check_node(&self, id: NodeId) -> Result<(), GraphError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id.0))
        }
    }

    /// Extends `contract` from `lender` to `debtor`.
    ///
    /// Creates the edge pair on first contact, mirrors the incidence on
    /// the debtor's side and refreshes the cached maximum timestamps.
    pub fn add_contract(
        &mut self,
        lender: NodeId,
        debtor: NodeId,
        contract: Contract,
    ) -> Result<ContractId, GraphError> {
        self.check_node(lender)?;
        self.check_node(debtor)?;
        if lender == debtor {
            return Err(GraphError::SelfLoop(self.nodes[lender.0].name.clone()));
        }
        if self.contract_ids.contains_key(contract.name()) {
            return Err(GraphError::DuplicateContract {
                graph: self.name.clone(),
                name: contract.name().to_string(),
            });
        }

        let timestamp = contract.timestamp();
        let id = ContractId(self.contracts.len());
        self.contract_ids.insert(contract.name().to_string(), id);
        self.contracts.push(contract);

        let out_list = self.nodes[lender.0].out.entry(debtor).or_default();
        if out_list.is_empty() {
            self.edge_count += 1;
        }
        out_list.push(id);
        self.nodes[debtor.0].inc.entry(lender).or_default().push(id);
        self.contract_count += 1;

        let lender_node = &mut self.nodes[lender.0];
        lender_node.maximum_timestamp = lender_node.maximum_timestamp.max(timestamp);
        let debtor_node = &mut self.nodes[debtor.0];
        debtor_node.maximum_timestamp = debtor_node.maximum_timestamp.max(timestamp);
        self.maximum_timestamp = self.maximum_timestamp.max(timestamp);

        Ok(id)
    }

    /// Removes a node and every contract incident to it. Returns whether
    /// the node existed. The node arena is compacted, so previously
    /// handed out `NodeId`s are invalidated; `ContractId`s of surviving
    /// contracts keep pointing at their contracts — only the removed
    /// contracts' names are released.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(&id) = self.node_ids.get(name) else {
            return false;
        };
        self.detach(id);
        self.nodes.remove(id.0);
        self.node_ids.remove(name);
        for node_id in self.node_ids.values_mut() {
            if node_id.0 > id.0 {
                node_id.0 -= 1;
            }
        }
        let remap = |key: NodeId| {
            if key.0 > id.0 {
                NodeId(key.0 - 1)
            } else {
                key
            }
        };
        for node in &mut self.nodes {
            node.out = node.out.drain(..).map(|(k, v)| (remap(k), v)).collect();
            node.inc = node.inc.drain(..).map(|(k, v)| (remap(k), v)).collect();
        }
        true
    }

    /// Detaches every contract incident to `id`, keeping the node itself.
    pub fn clear_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.check_node(id)?;
        self.detach(id);
        Ok(())
    }

    /// Detaches every edge incident to `id`, adjusting the counters. The
    /// contract arena keeps the orphaned entries; they are unreachable
    /// through the incidence and their names are released.
    fn detach(&mut self, id: NodeId) {
        let out: Vec<(NodeId, Vec<ContractId>)> = self.nodes[id.0].out.drain(..).collect();
        for (debtor, list) in out {
            self.edge_count -= 1;
            self.contract_count -= list.len();
            self.release_contracts(&list);
            self.nodes[debtor.0].inc.shift_remove(&id);
        }
        let inc: Vec<(NodeId, Vec<ContractId>)> = self.nodes[id.0].inc.drain(..).collect();
        for (lender, list) in inc {
            self.edge_count -= 1;
            self.contract_count -= list.len();
            self.release_contracts(&list);
            self.nodes[lender.0].out.shift_remove(&id);
        }
    }

    fn release_contracts(&mut self, ids: &[ContractId]) {
        for &cid in ids {
            let name = self.contracts[cid.0].name().to_string();
            self.contract_ids.remove(&name);
        }
    }

    /// Sum of outgoing contract values minus incoming ones at `time`.
    pub fn equity(&self, id: NodeId, time: f64) -> Result<f64, GraphError> {
        self.check_node(id)?;
        let node = &self.nodes[id.0];
        let mut equity = 0.0;
        for cid in node.outgoing() {
            let c = &self.contracts[cid.0];
            equity += c.value_at(time - c.timestamp())?;
        }
        for cid in node.incoming() {
            let c = &self.contracts[cid.0];
            equity -= c.value_at(time - c.timestamp())?;
        }
        Ok(equity)
    }

    /// Sum of outgoing contract values at `time`.
    pub fn outgoing_flow(&self, id: NodeId, time: f64) -> Result<f64, GraphError> {
        self.check_node(id)?;
        let mut flow = 0.0;
        for cid in self.nodes[id.0].outgoing() {
            let c = &self.contracts[cid.0];
            flow += c.value_at(time - c.timestamp())?;
        }
        Ok(flow)
    }

    /// Whether every node's equity at `time` is zero within the graph's
    /// epsilon.
    pub fn is_in_equilibrium_at(&self, time: f64) -> Result<bool, GraphError> {
        for i in 0..self.nodes.len() {
            if !self.epsilon.is_zero(self.equity(NodeId(i), time)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Largest absolute node equity at `time`.
    pub fn max_equity(&self, time: f64) -> Result<f64, GraphError> {
        let mut max = 0.0f64;
        for i in 0..self.nodes.len() {
            max = max.max(self.equity(NodeId(i), time)?.abs());
        }
        Ok(max)
    }

    /// Sum of outgoing flow over all nodes at `time`.
    pub fn total_flow_at(&self, time: f64) -> Result<f64, GraphError> {
        let mut total = 0.0;
        for i in 0..self.nodes.len() {
            total += self.outgoing_flow(NodeId(i), time)?;
        }
        Ok(total)
    }

    /// Human-readable listing of nodes, their counterparties and contract
    /// values at `time`.
    pub fn describe(&self, time: f64) -> Result<String, GraphError> {
        let mut text = String::new();
        for node in &self.nodes {
            let _ = writeln!(text, "[Node {}]", node.name);
            let _ = writeln!(text, "  Debtors:");
            for (&debtor, list) in &node.out {
                let _ = writeln!(text, "    [Node {}]", self.nodes[debtor.0].name);
                for &cid in list {
                    let c = &self.contracts[cid.0];
                    let value = c.value_at(time - c.timestamp())?;
                    let _ = writeln!(text, "      {}: {value:.6}", c.name());
                }
            }
            let _ = writeln!(text, "  Lenders:");
            for (&lender, list) in &node.inc {
                let _ = writeln!(text, "    [Node {}]", self.nodes[lender.0].name);
                for &cid in list {
                    let c = &self.contracts[cid.0];
                    let value = c.value_at(time - c.timestamp())?;
                    let _ = writeln!(text, "      {}: {value:.6}", c.name());
                }
            }
        }
        Ok(text)
    }

    pub fn set_cut_finder(&mut self, finder: Box<dyn DebtCutFinder>) -> &mut Self {
        self.finder = Some(finder);
        self
    }

    pub fn cut_finder(&self) -> Option<&dyn DebtCutFinder> {
        self.finder.as_deref()
    }

    /// Delegates to the installed finder.
    pub fn find_equilibrial_debt_cuts(
        &self,
        equilibrium_time: f64,
        times: &TimeAssignment,
    ) -> Result<CutSolution, SolveError> {
        let finder = self
            .finder
            .as_deref()
            .ok_or_else(|| SolveError::FinderNotSet(self.name.clone()))?;
        finder.compute(self, times, equilibrium_time)
    }

    /// A new graph with the same nodes in which every contract present in
    /// `cuts` is replaced by its cut version, re-anchored at its payment
    /// time. Contracts absent from `cuts` are not copied.
    pub fn apply_debt_cuts(
        &self,
        cuts: &DebtCutAssignment,
        times: &TimeAssignment,
    ) -> Result<Graph, GraphError> {
        let mut output = Graph::new(self.name.clone());
        output.set_epsilon(self.epsilon);
        for node in &self.nodes {
            output.add_node(node.name.clone())?;
        }
        for (lender_index, node) in self.nodes.iter().enumerate() {
            for (&debtor, list) in &node.out {
                let debtor_name = self.nodes[debtor.0].name.as_str();
                for &cid in list {
                    let contract = &self.contracts[cid.0];
                    let Some(cut) = cuts.get(contract) else {
                        continue;
                    };
                    let payment_time = times.get(debtor_name, contract.name()).ok_or_else(|| {
                        GraphError::MissingPaymentTime {
                            node: debtor_name.to_string(),
                            contract: contract.name().to_string(),
                        }
                    })?;
                    let replaced = contract.apply_debt_cut(cut, payment_time, self.epsilon)?;
                    output.add_contract(NodeId(lender_index), debtor, replaced)?;
                }
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::DebtCutAssignment;

    fn two_party() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new("test");
        let u = graph.add_node("u").unwrap();
        let v = graph.add_node("v").unwrap();
        (graph, u, v)
    }

    #[test]
    fn bookkeeping_counts_edges_and_contracts() {
        let (mut graph, u, v) = two_party();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.contract_count(), 0);

        graph
            .add_contract(u, v, Contract::continuous("a", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.contract_count(), 1);

        // a parallel contract shares the edge
        graph
            .add_contract(u, v, Contract::continuous("b", 2.0, 0.1, 0.0).unwrap())
            .unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.contract_count(), 2);

        // the reverse direction is its own edge
        graph
            .add_contract(v, u, Contract::continuous("c", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.contract_count(), 3);
    }

    #[test]
    fn incidence_is_mirrored() {
        let (mut graph, u, v) = two_party();
        let id = graph
            .add_contract(u, v, Contract::continuous("a", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        assert_eq!(graph.node(u).unwrap().contracts_to(v), &[id]);
        let incoming: Vec<ContractId> = graph.node(v).unwrap().incoming().collect();
        assert_eq!(incoming, vec![id]);
        assert_eq!(graph.node(v).unwrap().lenders().next(), Some(u));
    }

    #[test]
    fn rejects_duplicates_self_loops_and_stale_ids() {
        let (mut graph, u, v) = two_party();
        assert!(matches!(
            graph.add(Node::new("u")),
            Err(GraphError::DuplicateNode { .. })
        ));
        assert!(matches!(
            graph.add_contract(u, u, Contract::continuous("a", 1.0, 0.1, 0.0).unwrap()),
            Err(GraphError::SelfLoop(_))
        ));
        graph
            .add_contract(u, v, Contract::continuous("a", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        assert!(matches!(
            graph.add_contract(u, v, Contract::continuous("a", 9.0, 0.2, 1.0).unwrap()),
            Err(GraphError::DuplicateContract { .. })
        ));
        assert!(matches!(
            graph.add_contract(NodeId(9), v, Contract::continuous("b", 1.0, 0.1, 0.0).unwrap()),
            Err(GraphError::UnknownNode(9))
        ));
    }

    #[test]
    fn equity_nets_outgoing_against_incoming() {
        let (mut graph, u, v) = two_party();
        graph
            .add_contract(u, v, Contract::continuous("a", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        graph
            .add_contract(v, u, Contract::continuous("b", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        assert!(graph.equity(u, 2.0).unwrap().abs() < 1e-12);
        assert!(graph.is_in_equilibrium_at(2.0).unwrap());
        let flow = 2.0 * (0.1f64 * 2.0).exp();
        assert!((graph.total_flow_at(2.0).unwrap() - flow).abs() < 1e-12);
    }

    #[test]
    fn removal_detaches_and_compacts() {
        let mut graph = Graph::new("cycle");
        let a = graph.add_node("A").unwrap();
        let b = graph.add_node("B").unwrap();
        let c = graph.add_node("C").unwrap();
        graph
            .add_contract(a, b, Contract::continuous("ab", 10.0, 0.15, 3.0).unwrap())
            .unwrap();
        graph
            .add_contract(b, c, Contract::continuous("bc", 10.0, 0.15, 3.0).unwrap())
            .unwrap();
        graph
            .add_contract(c, a, Contract::continuous("ca", 10.0, 0.15, 3.0).unwrap())
            .unwrap();

        assert!(graph.remove("B"));
        assert!(!graph.remove("B"));
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.contract_count(), 1);
        assert!(graph.contract_id("ab").is_none());
        assert!(graph.contract_id("bc").is_none());
        assert!(graph.contract_id("ca").is_some());

        // ids compacted: C now directly after A, incidence remapped
        let a = graph.node_id("A").unwrap();
        let c = graph.node_id("C").unwrap();
        assert_eq!((a.index(), c.index()), (0, 1));
        assert_eq!(graph.node(c).unwrap().debtors().next(), Some(a));
        assert!(!graph.is_in_equilibrium_at(5.0).unwrap());
    }

    #[test]
    fn clearing_a_node_detaches_both_sides() {
        let (mut graph, u, v) = two_party();
        graph
            .add_contract(u, v, Contract::continuous("a", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        graph
            .add_contract(v, u, Contract::continuous("b", 1.0, 0.1, 0.0).unwrap())
            .unwrap();

        graph.clear_node(u).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.contract_count(), 0);
        assert_eq!(graph.node(v).unwrap().outgoing().count(), 0);
        assert_eq!(graph.node(v).unwrap().incoming().count(), 0);
        assert!(graph.clear_node(NodeId(7)).is_err());
    }

    #[test]
    fn empty_assignment_copies_no_contracts() {
        let (mut graph, u, v) = two_party();
        graph
            .add_contract(u, v, Contract::continuous("a", 1.0, 0.1, 0.0).unwrap())
            .unwrap();
        let mut times = TimeAssignment::new();
        times.put("v", "a", 1.0).unwrap();

        let applied = graph
            .apply_debt_cuts(&DebtCutAssignment::new(2.0), &times)
            .unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied.contract_count(), 0);
        assert_eq!(applied.edge_count(), 0);
        assert!(applied.contains("u") && applied.contains("v"));
    }

    #[test]
    fn applying_cuts_replaces_contracts() {
        let (mut graph, u, v) = two_party();
        let contract = Contract::continuous("a", 1.0, 0.1, 0.0).unwrap();
        graph.add_contract(u, v, contract.clone()).unwrap();
        let mut times = TimeAssignment::new();
        times.put("v", "a", 1.0).unwrap();

        let mut cuts = DebtCutAssignment::new(2.0);
        let value_at_payment = contract.value_at(1.0).unwrap();
        cuts.put(&contract, value_at_payment).unwrap();

        let applied = graph.apply_debt_cuts(&cuts, &times).unwrap();
        assert_eq!(applied.contract_count(), 1);
        let id = applied.contract_id("a").unwrap();
        let replaced = applied.contract(id).unwrap();
        assert_eq!(replaced.principal(), 0.0);
        assert_eq!(replaced.timestamp(), 1.0);
        assert!(applied.is_in_equilibrium_at(2.0).unwrap());
    }

    #[test]
    fn applying_cuts_honors_the_graph_epsilon() {
        let (mut graph, u, v) = two_party();
        graph.set_epsilon(Epsilon::new(0.5).unwrap());
        let contract = Contract::continuous("a", 1.0, 0.1, 0.0).unwrap();
        graph.add_contract(u, v, contract.clone()).unwrap();
        let mut times = TimeAssignment::new();
        times.put("v", "a", 1.0).unwrap();

        // overshoots the accrued value by more than the default tolerance,
        // but stays within this graph's loosened one
        let overshoot = contract.value_at(1.0).unwrap() + 0.25;
        let mut cuts = DebtCutAssignment::new(2.0);
        cuts.put(&contract, overshoot).unwrap();

        let applied = graph.apply_debt_cuts(&cuts, &times).unwrap();
        let replaced = applied.contract(applied.contract_id("a").unwrap()).unwrap();
        assert_eq!(replaced.principal(), 0.0);
        // the copy inherits the loosened tolerance
        assert_eq!(applied.epsilon(), Epsilon::new(0.5).unwrap());

        let mut strict = Graph::new("strict");
        let u = strict.add_node("u").unwrap();
        let v = strict.add_node("v").unwrap();
        strict.add_contract(u, v, contract.clone()).unwrap();
        strict.set_epsilon(Epsilon::new(1e-6).unwrap());
        assert!(matches!(
            strict.apply_debt_cuts(&cuts, &times),
            Err(GraphError::Contract(ContractError::CutOutOfRange { .. }))
        ));
    }

    #[test]
    fn finder_must_be_installed() {
        let (graph, _, _) = two_party();
        let times = TimeAssignment::new();
        assert!(matches!(
            graph.find_equilibrial_debt_cuts(1.0, &times),
            Err(SolveError::FinderNotSet(_))
        ));
    }

    #[test]
    fn describe_lists_both_sides() {
        let (mut graph, u, v) = two_party();
        graph
            .add_contract(u, v, Contract::continuous("a", 1.0, 0.0, 0.0).unwrap())
            .unwrap();
        let text = graph.describe(0.0).unwrap();
        assert!(text.contains("[Node u]"));
        assert!(text.contains("Debtors:"));
        assert!(text.contains("a: 1.000000"));
    }
}
