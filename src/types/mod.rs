mod condition;
mod error;
mod evaluation_report;
mod gate;
mod leaf;
mod registry;

pub use condition::{all_of, any_of, leaf, Condition, Junction, Leaves};
pub use error::{ReadError, WriteError};
pub use evaluation_report::{EvaluationReport, LeafOutcome};
pub use gate::{Gate, GateKind, GATE_CHILDREN, IF, IF_NOT};
pub use leaf::{BoxError, LeafCodec, LeafReader, LeafWriter, Predicate};
pub use registry::{
    LeafFactory, Statement, StatementRegistry, ALL_OF, ANY_OF, BUILT_IN, CONDITION,
};
