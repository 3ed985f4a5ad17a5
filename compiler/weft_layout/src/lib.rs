//! Optionality layout decisions and the compiled model.
//!
//! `compile()` takes a finalized `Schema` and an `AdjunctConfig` and fixes,
//! once, how every maybe slot stores its payload and which symbols an
//! emitter uses. The resulting `CompiledModel` is immutable and answers
//! every query emitters and the node runtime make.

mod classify;
mod config;
mod error;
mod layout;
mod model;

pub use classify::CycleClassifier;
pub use config::AdjunctConfig;
pub use error::LayoutError;
pub use layout::MaybeLayout;
pub use model::{compile, CompiledModel};
