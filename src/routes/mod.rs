/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. This structure ensures that
/// access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.
///
/// The three modules map directly to the defined access roles.

/// Routes accessible to all visitors (anonymous, read-only plus the auth forms).
pub mod public;

/// Routes protected by the `CurrentUser` extractor middleware.
/// Requires a validated session.
pub mod authenticated;

/// Routes restricted to the single seeded 'admin' account.
/// Implements mandatory authorization checks.
pub mod admin;
