//! Core types for migrations

mod value;
mod field_map;
mod mapping;
mod hook;
mod entity;

pub use value::*;
pub use field_map::*;
pub use mapping::*;
pub use hook::*;
pub use entity::*;

/// One row of raw cell values, in column order
pub type Record = Vec<String>;
