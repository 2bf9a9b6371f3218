// Clinic domain types
//
// DB-agnostic entity types shared by the storage layer and the HTTP API.
//
// Key design decisions:
// - Roles are a closed enum; their permission sets are fixed in code and seeded into the database
// - Entity status is a plain active/inactive flag, surfaced as EntityStatus in responses
// - Validation failures carry the offending form field so views can highlight it

pub mod account;
pub mod role;
pub mod specialty;
pub mod telemetry;
pub mod validation;

pub use account::{Account, Patient, Person};
pub use role::{Role, UnknownRole};
pub use specialty::{Doctor, EntityStatus, Specialty};
pub use validation::{require, FieldError};
