//! LAP descriptor model
//!
//! Maps flat named records (what a drawing form edits) onto a
//! [`GraphStore`](lapdata_graph::GraphStore):
//!
//! - bindings `[name, chain]` say where each name lives in the graph
//! - the schema resolver turns bindings into classes, descriptors and class
//!   edges, and materializes them into the store
//! - the write engine stores a record (plus repeated groups) as a tree of
//!   linked objects under one root
//! - the load engine reads such a tree back into the same record shape
//! - the clear engine removes a tree, deleting owned default objects and
//!   only unlinking shared ones
//!
//! ## Module Organization
//!
//! - `chain`: chain expression parsing
//! - `defaults`: built-in bindings and the tables derived from them
//! - `settings`: persisted binding lists
//! - `record`: the record shape
//! - `schema`: resolution + materialization
//! - `write`, `clear`, `load`: the engines
//! - `query`: lookups by sample id and descriptor values
//! - `observer`: notification and progress seams

pub mod chain;
mod clear;
pub mod defaults;
pub mod error;
mod load;
mod model;
pub mod observer;
mod query;
pub mod record;
pub mod schema;
pub mod settings;
mod write;

pub use chain::{parse_chain, Chain};
pub use clear::ClearOutcome;
pub use defaults::{SchemaConstants, NAME_ID};
pub use error::{ModelError, Result};
pub use load::LoadLookups;
pub use model::LapModel;
pub use observer::{ModelObserver, Progress};
pub use query::ArcStructure;
pub use record::{record_from_json, record_to_json, Field, GroupRow, Record};
pub use schema::{DataStructure, DescriptorTriple, MaterializedSchema, SchemaScope};
pub use settings::{AttributeBinding, DescriptorBinding, ModelSettings};
pub use write::{StoreOptions, WriteOutcome};
