// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential handling shared by the service broker crates.
//!
//! Two concerns live here:
//!
//! - [`Secret<T>`]: a wrapper for values such as database passwords that must
//!   never reach logs or serialized config dumps. Access requires `.expose()`.
//! - [`random_alphanumeric`]: generation of the passwords and user suffixes
//!   that service providers place into provisioned cluster secrets.
//!
//! # Example
//!
//! ```
//! use broker_common_secret::{random_alphanumeric, Secret};
//!
//! let password = Secret::new(random_alphanumeric(16));
//! assert_eq!(format!("{password}"), "[REDACTED]");
//! assert_eq!(password.expose().len(), 16);
//! ```

mod generate;
mod secret;

pub use generate::{random_alphanumeric, ALPHABET};
pub use secret::{Secret, SecretString, REDACTED};
