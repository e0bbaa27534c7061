#![doc = "frontup-core: planning and publishing logic for frontup."]

//! This crate turns a declarative file-to-key mapping into upload
//! instructions, picks the bucket for each key from a CDN's origins, and
//! drives the upload-then-invalidate pipeline through the collaborator
//! traits in [`contract`].
//!
//! # Usage
//! The CLI crate loads the config, wires AWS clients to the [`contract`]
//! traits and calls into [`deploy`].

pub mod content_type;
pub mod contract;
pub mod deploy;
pub mod error;
pub mod origin;
pub mod planner;
pub mod source;

pub use error::{DeployError, ErrorKind, PlanError};
pub use planner::{plan, UploadInstruction, UploadPlanner};
pub use source::SourceSpec;
