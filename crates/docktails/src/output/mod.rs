//! Output module — colors, prefixing, JSON pretty-printing and the
//! serializing sink writers.

pub mod color;
pub mod json;
pub mod prefix;
pub mod sink;

pub use color::{Color, ColorAllocator};
pub use prefix::{make_prefix, PrefixWriter};
pub use sink::SinkHandle;
