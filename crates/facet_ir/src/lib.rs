//! Facet IR - interned identifiers.
//!
//! Every interface name, type name, member name and injection key in the
//! facet crates is a [`Name`]: a 32-bit handle into a [`StringInterner`].
//! Registries key their maps by `Name`, so equality and hashing never touch
//! string contents after the first intern.
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: strings become `Name(u32)` once, at the boundary
//! - **Share One Interner**: a process uses a single [`SharedInterner`], so a
//!   `Name` minted by one crate is meaningful in all of them

mod interner;
mod name;

pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
