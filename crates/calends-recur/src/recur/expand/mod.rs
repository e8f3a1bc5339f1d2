//! Rule expansion and set composition.

mod iter;
mod merge;
mod rule;
mod set;


pub use iter::RuleIter;
pub use rule::{RecurrenceRule, RuleBuilder};
pub use set::{RecurrenceSet, SetIter};
