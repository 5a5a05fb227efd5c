pub mod credential;
pub mod error;
pub mod heuristics;
pub mod journal;
pub mod observation;

pub use credential::{Credential, CredentialResolver};
pub use error::{Error, Result};
pub use journal::Journal;
pub use observation::{ExtractionResult, Observation};
