//! Conversion safety: output validation and batch recording.
//!
//! - [`Validator`] decides whether a converted file may replace its original
//! - [`BatchRecorder`] writes commands to a script instead of running them

mod batch;
mod validator;

pub use batch::BatchRecorder;
pub use validator::{size_delta, Baseline, ContentCheck, SizePolicy, ValidationFailure, Validator};
