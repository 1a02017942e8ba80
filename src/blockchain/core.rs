// core.rs splits block structure and block checks into submodules.
pub mod chain;
pub mod validation;

pub use chain::*;
pub use validation::*;
