//! Core library for the overtime-recon command line application.
//!
//! The library exposes the reconciliation engine that powers the
//! command-line interface as well as the integration tests. The modules are
//! structured to keep responsibilities narrow and composable: the cell and
//! table data model lives in [`model`], per-source input normalization in
//! [`normalize`], the join/classification engine in [`reconcile`], workbook
//! adapters under [`io`], and the end-to-end orchestration in [`report`].
//!
//! The engine itself ([`normalize`] and [`reconcile`]) performs no I/O: it
//! maps two raw tables to a [`model::ReconReport`] and nothing else. File
//! formats and styling are the concern of [`io`] and [`report`].

pub mod error;
pub mod io;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod report;

pub use error::{ReconError, Result};
