//! Payroll Computation Engine
//!
//! This crate turns attendance records into weekly gross pay, applies the
//! Philippine statutory deductions (SSS, PhilHealth, Pag-IBIG and withholding
//! tax) and ad-hoc deductions, and sequences the Monday-to-Sunday payroll
//! periods entries are committed against.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
