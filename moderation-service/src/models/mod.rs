pub mod action;
pub mod ban;
pub mod catalog;
pub mod report;

pub use action::*;
pub use ban::*;
pub use catalog::*;
pub use report::*;
