//! Build metadata for the `topdown` binary.
//!
//! Values are injected by `build.rs`; any it could not determine read as "unknown".

/// Version string printed by `topdown --version` (after the binary name).
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TOPDOWN_COMMIT_SHA"),
    " ",
    env!("TOPDOWN_BUILD_DATE"),
    ") rustc ",
    env!("TOPDOWN_RUSTC_VERSION")
);

/// Full version line: "topdown {version} ({commit} {date}) rustc {rustc_version}"
pub fn version() -> String {
    format!("topdown {}", LONG_VERSION)
}

pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn build_commit() -> &'static str {
    env!("TOPDOWN_COMMIT_SHA")
}

pub fn build_date() -> &'static str {
    env!("TOPDOWN_BUILD_DATE")
}

pub fn rustc_version() -> &'static str {
    env!("TOPDOWN_RUSTC_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line_starts_with_package() {
        let line = version();
        assert!(line.starts_with(&format!("topdown {}", package_version())));
        assert!(line.contains(build_commit()));
        assert!(line.ends_with(rustc_version()));
    }
}
