pub mod grounding;
pub mod similarity;
pub mod types;

pub use grounding::*;
pub use similarity::*;
pub use types::*;
