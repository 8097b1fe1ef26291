//! Version information.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `User-Agent` sent to the remote API.
///
/// Reddit throttles generic agents much harder than identified ones, so
/// every request carries `huginn/{version}`.
pub fn user_agent() -> String {
    format!("huginn/{PKG_VERSION}")
}
