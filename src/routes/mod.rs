/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated
/// modules so access control is applied explicitly at the module level (via
/// Axum layers and extractors) rather than per handler ad hoc.

/// Routes accessible to all users (reads plus the two ungated mutations).
pub mod public;

/// Routes protected by the bearer-token middleware.
pub mod authenticated;

/// Routes restricted to users with the 'admin' role.
pub mod admin;
