// HTTP API routes
//
// Each submodule handles one area of the clinic with its own state.
// Page-style handlers answer JSON view models or redirects; status
// endpoints answer small JSON acknowledgements.

pub mod admin;
pub mod common;
pub mod doctors;
pub mod forms;
pub mod patients;
pub mod profile;
pub mod specialties;
pub mod users;

// Re-export common types
pub use common::{ApiError, ErrorResponse, ListResponse, StatusResponse};
