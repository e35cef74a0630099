#![warn(clippy::uninlined_format_args)]

pub mod assignment;
pub mod contract;
pub mod epsilon;
pub mod graph;
pub mod ports;

pub use assignment::{DebtCutAssignment, DebtCutError, TimeAssignment, TimeAssignmentError};
pub use contract::{Compounding, Contract, ContractBuilder, ContractError};
pub use epsilon::{Epsilon, current_epsilon, set_epsilon};
pub use graph::{ContractId, Graph, GraphError, Node, NodeId};
pub use ports::{CutSolution, DebtCutFinder, SolveError, SolveStats};
