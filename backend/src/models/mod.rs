//! Data models for the Study Vault catalog.
//!
//! Field names serialize in camelCase to match the browse client.

mod material;
mod university;
mod user;

pub use material::*;
pub use university::*;
pub use user::*;
