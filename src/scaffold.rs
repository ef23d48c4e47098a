use std::{
    fs::{self, Permissions},
    io,
    os::unix::fs::PermissionsExt,
};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::{
    channel,
    exec::Exec,
    template::{self, Context, Variant},
};

/// What happened to a single template file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Written {
    Created,
    /// Already present with identical content
    Unchanged,
    /// Already present with different content, left alone
    Skipped,
    /// Already present, moved aside to `backup` before writing
    Replaced { backup: Utf8PathBuf },
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub variant: Variant,
    pub dir: Utf8PathBuf,
    pub files: Vec<(Utf8PathBuf, Written)>,
}

impl Report {
    /// `configuration.nix` was left as it was, so it may still belong to the other layout
    pub fn kept_configuration(&self) -> bool {
        self.files
            .iter()
            .any(|(p, w)| p.as_str() == "configuration.nix" && *w == Written::Skipped)
    }
}

/// Detects home-manager, installing its channel from `channel_url` when missing, and picks the
/// layout accordingly. `None` disables the install attempt.
pub fn select_variant(exec: &impl Exec, channel_url: Option<&str>) -> io::Result<Variant> {
    if channel::check_home_manager(exec)?.home_manager {
        return Ok(Variant::HomeManager);
    }
    let Some(url) = channel_url else {
        log::info!("home-manager missing and channel install disabled");
        return Ok(Variant::Fallback);
    };
    if channel::install_home_manager(exec, url)? {
        Ok(Variant::HomeManager)
    } else {
        println!("could not install home-manager, writing a system-only configuration instead");
        Ok(Variant::Fallback)
    }
}

/// Creates `dir`, selects a layout, and writes it
pub fn scaffold(
    exec: &impl Exec,
    dir: &Utf8Path,
    ctx: &Context,
    channel_url: Option<&str>,
    overwrite: bool,
) -> io::Result<Report> {
    fs::create_dir_all(dir)?;
    match select_variant(exec, channel_url)? {
        Variant::HomeManager => create_home_manager_config(dir, ctx, overwrite),
        Variant::Fallback => create_fallback_config(dir, ctx, overwrite),
    }
}

pub fn create_home_manager_config(
    dir: &Utf8Path,
    ctx: &Context,
    overwrite: bool,
) -> io::Result<Report> {
    write_bundle(dir, Variant::HomeManager, ctx, overwrite)
}

pub fn create_fallback_config(dir: &Utf8Path, ctx: &Context, overwrite: bool) -> io::Result<Report> {
    write_bundle(dir, Variant::Fallback, ctx, overwrite)
}

fn write_bundle(
    dir: &Utf8Path,
    variant: Variant,
    ctx: &Context,
    overwrite: bool,
) -> io::Result<Report> {
    log::info!("writing {} layout to {}", variant, dir);
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.6fZ").to_string();
    let mut files = Vec::new();
    for file in template::bundle(variant) {
        let path = dir.join(file.path);
        let written = write_file(&path, &ctx.render(file.body), overwrite, &stamp)?;
        if file.executable && written != Written::Skipped {
            fs::set_permissions(&path, Permissions::from_mode(0o755))?;
        }
        log::debug!("{}: {:?}", path, written);
        files.push((Utf8PathBuf::from(file.path), written));
    }
    let report = Report {
        variant,
        dir: dir.to_path_buf(),
        files,
    };
    if report.kept_configuration() {
        log::warn!(
            "configuration.nix was kept as is and may not match the {} layout; rerun with --overwrite to replace it",
            variant
        );
    }
    Ok(report)
}

fn write_file(path: &Utf8Path, contents: &str, overwrite: bool, stamp: &str) -> io::Result<Written> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs::write(path, contents)?;
        return Ok(Written::Created);
    }
    if fs::read_to_string(path).is_ok_and(|old| old == contents) {
        return Ok(Written::Unchanged);
    }
    if !overwrite {
        log::warn!("{} already exists, leaving it alone (pass --overwrite to replace)", path);
        return Ok(Written::Skipped);
    }
    let backup = backup_path(path, stamp);
    fs::rename(path, &backup)?;
    fs::write(path, contents)?;
    Ok(Written::Replaced { backup })
}

/// `<path>.bak-<stamp>`, with a counter appended when that is already taken
fn backup_path(path: &Utf8Path, stamp: &str) -> Utf8PathBuf {
    let base = format!("{}.bak-{}", path, stamp);
    let mut candidate = Utf8PathBuf::from(&base);
    let mut n = 1;
    while candidate.exists() {
        candidate = Utf8PathBuf::from(format!("{}-{}", base, n));
        n += 1;
    }
    candidate
}
