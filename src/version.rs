//! Build identification for `clearbin version`.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");
const GIT_DIRTY: Option<&str> = option_env!("VERGEN_GIT_DIRTY");

/// `0.1.0 (abc1234)`, with `, dirty` for a modified tree, or the bare
/// package version when built outside git.
pub fn version_string() -> String {
    match GIT_SHA {
        Some(sha) => {
            let short = sha.get(..7).unwrap_or(sha);
            let dirty = if GIT_DIRTY == Some("true") { ", dirty" } else { "" };
            format!("{PKG_VERSION} ({short}{dirty})")
        }
        None => PKG_VERSION.to_string(),
    }
}
