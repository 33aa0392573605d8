//! Individual factory: random initialisation, mutation and boundary wrap.
//!
//! Stateless. The optimizer consumes these through the
//! [`IndividualFactory`] capability so tests can swap in deterministic
//! stand-ins.

pub mod boundary;
pub mod factory;

pub use boundary::boundary;
pub use factory::{IndividualFactory, UniformFactory};
