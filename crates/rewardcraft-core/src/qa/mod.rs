//! Boundary of the external question-answering collaborator.
//!
//! The model behind it is not part of this crate. [`Answerer`] is the seam a
//! concrete backend plugs into, [`QaService`] applies the batch and failure
//! policy, and [`QaClient`] talks to a deployed service over HTTP.

pub mod answerer;
pub mod client;
pub mod service;

pub use answerer::{from_async_fn, Answerer};
pub use client::QaClient;
pub use service::{QaError, QaService, ANSWER_ERROR_PREFIX};
