//! Authentication
//!
//! Bearer session tokens issued by `/auth/signin` and `/auth/signup`.

mod bearer;

pub use bearer::{auth_middleware, BearerToken};
