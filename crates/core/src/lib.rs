//! Core types, cXML document model, and error taxonomy for the PunchOut storefront.

pub mod cart;
pub mod catalog;
pub mod cxml;
pub mod error;
pub mod error_log;
pub mod limits;
pub mod session;
pub mod taxonomy;
pub mod user;

pub use cart::*;
pub use catalog::*;
pub use cxml::{Cxml, Operation};
pub use error::{AuthErrorCode, Error, ErrorCategory, InputErrorCode, ResourceErrorCode, Result};
pub use error_log::*;
pub use session::*;
pub use user::*;
