//! REST surface under `/loyalty/v1`.
//!
//! Transport types live in `dto`; handlers translate them to SDK models and
//! call the domain service. Errors are rendered as RFC 9457 problems.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod problem;
pub mod routes;
