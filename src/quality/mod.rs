pub mod grade;
pub mod units;

pub use grade::{classify, parse_index};
