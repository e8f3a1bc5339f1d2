pub mod core;
pub mod expand;
pub mod offset;
