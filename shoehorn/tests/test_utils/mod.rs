#![allow(dead_code)]

mod fixtures;
mod properties;

pub use fixtures::*;
pub use properties::*;
