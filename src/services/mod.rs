// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod aggregate;
pub mod identity;
pub mod mailer;
pub mod recorder;
pub mod twofactor;

pub use identity::{IdentityAccount, IdentityClient};
pub use mailer::Mailer;
pub use recorder::ActivityRecorder;
pub use twofactor::TwoFactorService;
