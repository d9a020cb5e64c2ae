//! Attack composition and execution.
//!
//! ## Submodules
//!
//! - [`traits`]: component and collaborator traits
//! - [`runner`]: the [`Attack`] runner and dataset iteration
//! - [`observer`]: per-iteration progress hooks

pub mod observer;
pub mod runner;
pub mod traits;

pub use observer::{AttackObserver, IterationReport, NoopObserver, RecordingObserver};
pub use runner::{Attack, AttackIter, DynAttack};
pub use traits::{
    Constraint, EntityTagSet, ExclusiveModel, GoalFunction, Model, NeighborLookup, SearchMethod,
    TaggedWord, Tagger, Transformation, WordSwap,
};
