//! Core types for VeriQuick.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;
pub mod verification;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Amount, AmountError};
pub use status::*;
pub use verification::VerificationKind;
