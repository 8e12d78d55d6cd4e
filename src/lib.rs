/////////////////////////////////////////////////////////////////////////////////////
//
// Contagion model
//
// An infection spreading through a population linked by a directed contact
// graph. People get infected, fall sick, recover or die, one step at a time.
//
////////////////////////////////////////////////////////////////////////////////////

pub mod data_management;
pub mod error;
pub mod stats;
pub mod utilities;
pub mod world;

pub use error::ContagionError;
pub use stats::StatisticsSnapshot;
pub use utilities::{simulate_prob, RandomSource, ScriptedRandom, StdRandom};
pub use world::{ContactGraph, DiseaseStatus, MitigationScope, Person, PersonId};
