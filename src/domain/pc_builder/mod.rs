//! Deterministic PC-builder flow: one guided selection step per component
//! category, with a question-answering sub-path grounded on the menu the
//! user is looking at.

mod handler;
mod state;

pub use handler::{BuilderOutcome, PcBuilderFlow};
pub use state::{CandidateMenu, PcBuilderData, PcBuilderState, PcBuilderStep};
