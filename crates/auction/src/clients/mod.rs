//! External collaborators consumed by the core

pub mod profiles;

pub use profiles::{ProfileDirectory, StaticProfileDirectory};
