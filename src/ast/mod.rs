//! Typed representation of the query DSL.

pub mod nodes;
pub mod operators;
pub mod values;

pub use nodes::*;
pub use operators::*;
pub use values::*;
