//! Convenience launch of the storefront in the local browser after bind.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{info, warn};

#[cfg(target_os = "macos")]
const OPENER_CANDIDATES: &[&str] = &["open"];
#[cfg(target_os = "windows")]
const OPENER_CANDIDATES: &[&str] = &["cmd"];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER_CANDIDATES: &[&str] = &["xdg-open", "sensible-browser", "x-www-browser"];

fn resolve_opener() -> Option<PathBuf> {
    OPENER_CANDIDATES.iter().find_map(|candidate| which::which(candidate).ok())
}

/// Best effort: failing to open a browser never affects the server.
pub fn open_storefront(url: &str) {
    let Some(opener) = resolve_opener() else {
        warn!(
            event_name = "system.browser.no_opener",
            correlation_id = "bootstrap",
            url,
            "no browser opener found on PATH; open the URL manually"
        );
        return;
    };

    let mut command = Command::new(&opener);
    if opener.file_stem().is_some_and(|stem| stem == "cmd") {
        command.args(["/C", "start", "", url]);
    } else {
        command.arg(url);
    }

    match command.stdout(Stdio::null()).stderr(Stdio::null()).spawn() {
        Ok(_) => info!(
            event_name = "system.browser.opened",
            correlation_id = "bootstrap",
            url,
            opener = %opener.display(),
            "opened storefront in browser"
        ),
        Err(error) => warn!(
            event_name = "system.browser.failed",
            correlation_id = "bootstrap",
            url,
            error = %error,
            "failed to open browser"
        ),
    }
}
