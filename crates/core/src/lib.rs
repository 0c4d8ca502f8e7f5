//! Modcheck Core - rule store and checksum engine
//!
//! Validates UK sort code / account number pairs against published
//! modulus weight tables.
//!
//! # Invariants
//!
//! 1. NO Mutex/RwLock on the validation path
//! 2. Installed snapshots are never mutated
//! 3. NO panic on user input

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bundled;
pub mod engine;
pub mod error;
pub mod input;
pub mod parser;
pub mod rules;
pub mod store;

pub use bundled::BundledTables;
pub use engine::{evaluate_rule, validate};
pub use error::{FormatError, LineError};
pub use input::NormalizedInput;
pub use parser::{parse_substitution_table, parse_weight_table};
pub use rules::{Algorithm, RuleSnapshot, SubstitutionEntry, WeightRule, WEIGHT_COUNT};
pub use store::RuleStore;
