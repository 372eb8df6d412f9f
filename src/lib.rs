// roughly in abstraction order
pub mod common;
pub mod params;
pub mod encode;
pub mod spec;
pub mod zdd;
pub mod eval;
pub mod enumerate;
