//! NovelSpec specification engine.
//!
//! This crate reads the Markdown dialect used for novel specs and change
//! deltas, validates change directories, and merges approved deltas into the
//! base specs when a change is archived.

pub mod archive;
pub mod layout;
pub mod merge;
pub mod messages;
pub mod model;
pub mod parser;
pub mod proposal;
pub mod tasks;
pub mod validator;

pub use archive::*;
pub use layout::*;
pub use merge::*;
pub use messages::*;
pub use model::*;
pub use parser::*;
pub use proposal::*;
pub use tasks::*;
pub use validator::*;
