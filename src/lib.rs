//! Credit-weighted GPA and CGPA calculation.
//!
//! [`calc`] holds the pure core: marks→grade-point mapping, semester
//! aggregation and cumulative combination. [`input`] normalises raw host
//! values before they reach the core, [`config`] picks the active grade
//! scale, and [`ipc`] is the JSON-lines sidecar surface around all three.

pub mod calc;
pub mod config;
pub mod input;
pub mod ipc;
