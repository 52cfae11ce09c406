//! nowpy - run a Python script with its dependencies installed on the fly
//!
//! This library provides the pieces behind the `nowpy` launcher:
//! - Manifest discovery and parsing (requirements.txt, pyproject.toml)
//! - Import scanning of the target script
//! - Reconciliation of declared, imported and installed packages
//! - Per-project isolated environments with LRU pruning

pub mod cli;
pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod observability;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod scanner;
