pub mod extraction;
pub mod processor;
pub mod safety;
pub mod structuring;
