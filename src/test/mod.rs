//! Shared factories for unit tests.
//!
//! - [`bytecode`] assembles the variable-length switch instructions at a given code offset
//! - [`classfile`] builds constant pools and complete class files in memory
