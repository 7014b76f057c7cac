pub mod macros;

/// Returns the version of this build.
///
/// Release builds set `AGENTSITE_VERSION` at compile time (e.g. to the git tag),
/// everything else falls back to the crate version.
pub const fn agentsite_version() -> &'static str {
    match option_env!("AGENTSITE_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
}
