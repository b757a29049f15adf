//! Core value types for attribute normalization.

mod value;

pub use value::{Value, ValueType};
