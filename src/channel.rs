use std::io;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::exec::Exec;

/// Name home-manager is registered under, both as a channel and on the nix search path
pub const HOME_MANAGER: &str = "home-manager";
pub const DEFAULT_CHANNEL_URL: &str =
    "https://github.com/nix-community/home-manager/archive/master.tar.gz";

/// Result of probing the nix search path for home-manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub home_manager: bool,
    /// Where `<home-manager>` resolved to, when it did
    pub path: Option<Utf8PathBuf>,
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(p) => write!(f, "home-manager: available ({})", p),
            None => write!(f, "home-manager: not found on root's nix search path"),
        }
    }
}

/// Whether `<home-manager>` resolves for root, i.e. `sudo nix-instantiate --find-file
/// home-manager` succeeds. `nixos-rebuild` evaluates the configuration as root, so a per-user
/// channel of the invoking user does not count.
///
/// # Errors
///
/// Only when `sudo` could not be started at all.
pub fn check_home_manager(exec: &impl Exec) -> io::Result<Probe> {
    let args = ["--find-file", HOME_MANAGER].map(String::from);
    let out = exec.capture_privileged("nix-instantiate", &args)?;
    if !out.success {
        log::info!("home-manager not resolvable: {}", out.stderr.trim());
        return Ok(Probe {
            home_manager: false,
            path: None,
        });
    }
    let path = out.stdout.trim();
    log::info!("home-manager resolved to {}", path);
    Ok(Probe {
        home_manager: true,
        path: (!path.is_empty()).then(|| Utf8PathBuf::from(path)),
    })
}

/// Registers the home-manager channel for root and updates it. `<home-manager/nixos>` is
/// evaluated by `nixos-rebuild`, which runs as root, so the channel belongs to root as well.
///
/// Returns `false` as soon as either step fails; nothing is undone.
pub fn install_home_manager(exec: &impl Exec, url: &str) -> io::Result<bool> {
    println!("installing the {} channel from {}", HOME_MANAGER, url);
    let add = ["--add", url, HOME_MANAGER].map(String::from);
    if !exec.privileged("nix-channel", &add, false)? {
        log::warn!("`nix-channel --add` failed");
        return Ok(false);
    }
    if !exec.privileged("nix-channel", &["--update".to_string()], false)? {
        log::warn!("`nix-channel --update` failed");
        return Ok(false);
    }
    Ok(true)
}
