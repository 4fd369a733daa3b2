pub mod baseline;
pub mod comparison;
pub mod frequency;

pub use comparison::CohortKey;
