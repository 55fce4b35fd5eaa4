//! Shared types of the Tables ⇄ Survey bridge.
//!
//! The crate holds only data: metadata records, typed values, form bindings,
//! row addresses and launch outcomes. Everything that touches the store or
//! the operating system lives in the backend.

pub mod domain;
pub mod enums;
pub mod shared;
pub mod usecases;
