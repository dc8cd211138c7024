//! diffsel — answers "which tests must run for this diff?".
//!
//! Consumes a git diff and a whole-program Python call graph supplied by an
//! external static-analysis provider, and produces the qualified names
//! (`file.py::Class::test_name`) of every test reachable from a changed line
//! through calls, decorators, inherited methods, or imports.

pub mod augment;
pub mod cli;
pub mod config;
pub mod diff;
pub mod model;
pub mod provider;
pub mod scanner;
pub mod select;
pub mod util;
