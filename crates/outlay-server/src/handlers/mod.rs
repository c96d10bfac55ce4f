//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod budgets;
pub mod expenses;
pub mod portfolio;
pub mod reference;
pub mod repayments;
pub mod rules;

// Re-export all handlers for use in router
pub use budgets::*;
pub use expenses::*;
pub use portfolio::*;
pub use reference::*;
pub use repayments::*;
pub use rules::*;
