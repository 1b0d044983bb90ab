//! Pipeline module - listing, unprotecting and converting workbooks

pub mod converter;
pub mod layout;
pub mod lister;
pub mod unprotect;
pub mod xlsx;

pub use converter::*;
pub use layout::*;
pub use lister::*;
pub use unprotect::*;
