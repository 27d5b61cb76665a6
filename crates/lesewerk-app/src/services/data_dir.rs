// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "lesewerk";

/// Return the application data directory, creating it if needed.
///
/// This is where `config.json` lives.
pub fn data_dir() -> PathBuf {
    let base = resolve_base(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    );
    let dir = base.join(APP_DIR);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "could not create data directory");
    }
    dir
}

fn resolve_base(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    // XDG data dir, then ~/.local/share
    if let Some(xdg) = xdg_data_home.filter(|p| !p.as_os_str().is_empty()) {
        return xdg;
    }
    if let Some(home) = home {
        return home.join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_xdg_data_home() {
        let base = resolve_base(Some("/xdg".into()), Some("/home/ink".into()));
        assert_eq!(base, PathBuf::from("/xdg"));
    }

    #[test]
    fn falls_back_to_home_share() {
        let base = resolve_base(None, Some("/home/ink".into()));
        assert_eq!(base, PathBuf::from("/home/ink/.local/share"));

        let base = resolve_base(Some(PathBuf::new()), Some("/home/ink".into()));
        assert_eq!(base, PathBuf::from("/home/ink/.local/share"));
    }

    #[test]
    fn last_resort_is_temp() {
        assert_eq!(resolve_base(None, None), std::env::temp_dir());
    }
}
