//! Request/response DTOs, versioned like the route tree.

pub mod v1;
