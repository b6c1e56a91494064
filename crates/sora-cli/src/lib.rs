//! SORA CLI - Command line tools for SORA risk assessments.
//!
//! Binaries:
//! - sora_assess: classify sites from a local JSON file
//! - submit_site: store sites in a project on a running server

pub mod client;
pub mod input;
pub mod report;

pub use client::SoraClient;
pub use input::load_sites;
