pub mod entry;
pub mod path;
pub mod value;

pub use entry::{RawEntry, RawMap, ATTRIBUTE_OC};
pub use value::Value;
