//! # Stabchain
//!
//! Stabchain is a Rust library for computing with permutation groups through
//! a base and strong generating set ([`bsgs::Bsgs`]). Groups are built with
//! deterministic or randomized Schreier–Sims, bases are changed by
//! conjugation and transposition, and subgroups defined by a property are
//! found by backtrack search, either over the stabilizer chain or over
//! ordered partitions.
//!
//! Points are `0..degree`. The validated entry points live in [`api`].

pub mod api;
pub mod bsgs;
pub mod change;
pub mod config;
pub mod construct;
pub mod error;
pub mod orbit;
pub mod permutation;
pub mod predicate;
pub mod search;
pub mod sorter;
pub mod transversal;
pub mod typed_vec;

pub use bsgs::Bsgs;
pub use error::GroupError;
pub use permutation::Permutation;
