//! Core errors and constants for the `breakwater` workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias
//!   shared by the settings loader and the demo binary.
//! - **`constants`**: Environment variable names and the default policy
//!   parameters.

pub mod constants;
pub mod errors;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
};
