//! lesen-core: exam model, answer models, session state machine and scoring.
//!
//! This crate defines the reading-exam data model, the per-part answer
//! models, the part state machine that sequences a session, and the
//! weighted scoring that the rest of lesen builds on.

pub mod answers;
pub mod error;
pub mod history;
pub mod library;
pub mod model;
pub mod resolver;
pub mod results;
pub mod scoring;
pub mod session;
pub mod traits;
pub mod validate;

pub use error::ExamError;
pub use model::{ExamContent, ExamTheme, ItemId, Level, PartKind};
pub use session::{Session, Stage};

#[cfg(test)]
pub(crate) mod testutil;
