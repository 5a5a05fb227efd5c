use std::path::PathBuf;

const BINARY_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

const CANDIDATE_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Locate a Chrome/Chromium binary: PATH lookup first, then fixed candidates.
pub fn find_chrome() -> Option<PathBuf> {
    for name in BINARY_NAMES {
        if let Ok(path) = which::which(name) {
            tracing::debug!("found browser binary on PATH: {}", path.display());
            return Some(path);
        }
    }

    for candidate in CANDIDATE_PATHS {
        let path = PathBuf::from(candidate);
        if path.exists() {
            tracing::debug!("found browser binary at {}", path.display());
            return Some(path);
        }
    }

    None
}
