use std::io::{self, ErrorKind};

use camino::Utf8PathBuf;

pub const DEFAULT_FILE_DIR: &str = "/etc/nixos";
pub const DEFAULT_STATE_VERSION: &str = "24.05";
/// Under the user's config dir, i.e. `~/.config/nixos`
pub const DOTFILES_SUBDIR: &str = "nixos";

/// Login name of the invoking user, from the passwd database, falling back to `$USER`
///
/// # Errors
///
/// Neither source yields a name
pub fn current_user() -> io::Result<String> {
    match nix::unistd::User::from_uid(nix::unistd::Uid::current()) {
        Ok(Some(user)) => return Ok(user.name),
        Ok(None) => log::debug!("uid not present in passwd database"),
        Err(e) => log::debug!("passwd lookup failed: {}", e),
    }
    std::env::var("USER").map_err(|_| {
        io::Error::new(
            ErrorKind::NotFound,
            "Could not determine the current user. Pass --user",
        )
    })
}

/// # Errors
///
/// The hostname is unreadable or not valid utf8
pub fn current_hostname() -> io::Result<String> {
    hostname::get()?.into_string().map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidData,
            "hostname read gave non-utf8 result".to_string(),
        )
    })
}

/// # Errors
///
/// No home directory, or one that is not valid utf8
pub fn home_directory() -> io::Result<Utf8PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not locate home directory"))?;
    utf8(home)
}

/// `~/.config/nixos` on linux
///
/// # Errors
///
/// No config directory, or one that is not valid utf8
pub fn default_dotfiles_dir() -> io::Result<Utf8PathBuf> {
    let config = dirs::config_dir()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not locate config directory"))?;
    Ok(utf8(config)?.join(DOTFILES_SUBDIR))
}

fn utf8(path: std::path::PathBuf) -> io::Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|p| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("Path is not valid utf8: {}", p.display()),
        )
    })
}
