//! Filter module — container selection by name prefix.

pub mod engine;

pub use engine::NamePrefixFilter;
