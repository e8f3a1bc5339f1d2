//! Relative calendar offsets.

mod builder;
mod delta;

pub use builder::OffsetBuilder;
pub use delta::CalendarOffset;
