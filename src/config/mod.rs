//! Configuration loading and management for the Payroll Computation Engine.
//!
//! This module provides functionality to load the statutory deduction schedule
//! (contribution parameters and the withholding tax table) and payroll run
//! settings from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/ph_2025").unwrap();
//! println!("Loaded schedule: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ContributionsConfig, CoveragePolicy, PagIbigConfig, PhilHealthConfig, RunSettings,
    ScheduleMetadata, SssConfig, StatutorySchedule, TaxBracket, TaxBracketsConfig,
};
