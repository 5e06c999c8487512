//! Wire and domain types shared between the catalog client core and its consumers.

pub mod domain;
pub mod error;
pub mod protocol;
