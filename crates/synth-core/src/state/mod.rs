//! State tracking for a single trade submission.
//!
//! A submission moves forward through call construction, gas estimation and
//! broadcast. Any step may fail, after which nothing else happens.

pub mod submission;

pub use submission::{SubmissionState, SubmissionStateError, SubmissionTracker};
