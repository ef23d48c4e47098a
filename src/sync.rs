use std::{fs, io};

use camino::{Utf8Path, Utf8PathBuf};

use crate::{error::Error, exec::Exec, template};

/// Flags of the sync helper. They combine freely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SyncFlags {
    /// Rebuild even when no file changed
    pub force: bool,
    /// Hide rebuild output and progress messages
    pub silent: bool,
    /// Stop after the syntax check
    pub check: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// `--check`: every file parsed
    Checked { files: usize },
    /// Nothing differed from the target, rebuild skipped
    UpToDate,
    Rebuilt { copied: Vec<Utf8PathBuf> },
}

/// Patterns read from the dotfiles' ignore list
#[derive(Debug, Default)]
pub struct IgnoreList {
    patterns: Vec<glob::Pattern>,
}

impl IgnoreList {
    /// Missing file means nothing is ignored. Unparsable lines are dropped with a warning.
    pub fn load(dir: &Utf8Path) -> io::Result<Self> {
        let path = dir.join(template::IGNORE_FILE);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Self::parse(&body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn parse(body: &str) -> Self {
        let patterns = body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| {
                let l = l.trim_start_matches('/').trim_end_matches('/');
                glob::Pattern::new(l)
                    .map_err(|e| log::warn!("ignoring bad pattern {:?}: {}", l, e))
                    .ok()
            })
            .collect();
        Self { patterns }
    }

    /// A pattern matches either the whole relative path or any single component of it
    pub fn is_ignored(&self, rel: &Utf8Path) -> bool {
        self.patterns.iter().any(|p| {
            p.matches(rel.as_str()) || rel.components().any(|c| p.matches(c.as_str()))
        })
    }
}

/// Relative paths of every nix file under `source`, sorted, minus ignored ones. Hidden
/// directories are not descended into.
pub fn collect_files(source: &Utf8Path, ignore: &IgnoreList) -> io::Result<Vec<Utf8PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![Utf8PathBuf::new()];
    while let Some(rel_dir) = pending.pop() {
        for entry in source.join(&rel_dir).read_dir_utf8()? {
            let entry = entry?;
            let rel = rel_dir.join(entry.file_name());
            if entry.file_name().starts_with('.') || ignore.is_ignored(&rel) {
                log::trace!("skipping {}", rel);
                continue;
            }
            let kind = entry.file_type()?;
            if kind.is_dir() {
                pending.push(rel);
            } else if kind.is_file() && template::is_synced(&rel) {
                found.push(rel);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Runs `nix-instantiate --parse` on every file, returning those that failed
pub fn syntax_probe(
    exec: &impl Exec,
    source: &Utf8Path,
    files: &[Utf8PathBuf],
) -> Result<Vec<Utf8PathBuf>, Error> {
    let mut failed = Vec::new();
    for rel in files {
        let args = vec!["--parse".to_string(), source.join(rel).into_string()];
        let out = exec
            .capture("nix-instantiate", &args)
            .map_err(|source| Error::Spawn {
                program: "nix-instantiate".into(),
                source,
            })?;
        if !out.success {
            eprintln!("{}", out.stderr.trim_end());
            failed.push(rel.clone());
        }
    }
    Ok(failed)
}

/// Files whose content differs from their counterpart under `target`, including those the
/// target lacks
pub fn changed_files(
    source: &Utf8Path,
    target: &Utf8Path,
    files: &[Utf8PathBuf],
) -> io::Result<Vec<Utf8PathBuf>> {
    let mut changed = Vec::new();
    for rel in files {
        let new = fs::read(source.join(rel))?;
        let old = fs::read(target.join(rel)).ok();
        if old.as_deref() != Some(new.as_slice()) {
            changed.push(rel.clone());
        }
    }
    Ok(changed)
}

/// Check, copy, rebuild.
///
/// # Errors
///
/// - no nix files under `source`
/// - any file fails the syntax check (nothing is copied)
/// - a privileged copy fails (earlier copies stay in place)
/// - `nixos-rebuild switch` exits non-zero
pub fn run_sync(
    exec: &impl Exec,
    source: &Utf8Path,
    target: &Utf8Path,
    flags: &SyncFlags,
) -> Result<SyncOutcome, Error> {
    let say = |msg: &str| {
        if !flags.silent {
            println!("{}", msg);
        }
    };

    let ignore = IgnoreList::load(source)?;
    let files = collect_files(source, &ignore)?;
    if files.is_empty() {
        return Err(Error::NothingToSync(source.to_path_buf()));
    }
    log::debug!("sync candidates: {:?}", files);

    let failed = syntax_probe(exec, source, &files)?;
    if !failed.is_empty() {
        return Err(Error::Syntax { files: failed });
    }
    say(&format!("syntax check passed ({} files)", files.len()));
    if flags.check {
        return Ok(SyncOutcome::Checked { files: files.len() });
    }

    let changed = changed_files(source, target, &files)?;
    if changed.is_empty() && !flags.force {
        say("already in sync, skipping rebuild (use --force to rebuild anyway)");
        return Ok(SyncOutcome::UpToDate);
    }

    for rel in &changed {
        let dst = target.join(rel);
        let args = ["-D", "-m", "0644", source.join(rel).as_str(), dst.as_str()].map(String::from);
        let copied = exec
            .privileged("install", &args, flags.silent)
            .map_err(|source| Error::Spawn {
                program: "sudo".into(),
                source,
            })?;
        if !copied {
            return Err(Error::Copy {
                file: rel.clone(),
                target: dst,
            });
        }
        say(&format!("copied {}", rel));
    }

    say("running nixos-rebuild switch");
    let rebuilt = exec
        .privileged("nixos-rebuild", &["switch".to_string()], flags.silent)
        .map_err(|source| Error::Spawn {
            program: "sudo".into(),
            source,
        })?;
    if !rebuilt {
        return Err(Error::Rebuild);
    }
    Ok(SyncOutcome::Rebuilt { copied: changed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::fake::FakeExec;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Dirs {
        _tmp: TempDir,
        source: Utf8PathBuf,
        target: Utf8PathBuf,
    }

    fn dirs() -> Dirs {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        let source = root.join("dotfiles");
        let target = root.join("etc-nixos");
        fs::create_dir_all(source.join("modules")).unwrap();
        fs::create_dir_all(&target).unwrap();
        fs::write(source.join("configuration.nix"), "{ }\n").unwrap();
        fs::write(source.join("modules/boot.nix"), "{ boot = { }; }\n").unwrap();
        fs::write(source.join("sync.sh"), "#!/bin/sh\n").unwrap();
        fs::write(source.join("hardware-configuration.nix"), "{ }\n").unwrap();
        fs::write(source.join(".gitignore"), "hardware-configuration.nix\nresult\n").unwrap();
        Dirs {
            _tmp: tmp,
            source,
            target,
        }
    }

    #[test]
    fn ignore_list_matches_names_and_paths() {
        let ignore = IgnoreList::parse(indoc! {"
            # build output
            /result
            result-*
            *.bak-*

            modules/private/
        "});
        assert!(ignore.is_ignored(Utf8Path::new("result")));
        assert!(ignore.is_ignored(Utf8Path::new("result-2")));
        assert!(ignore.is_ignored(Utf8Path::new("modules/boot.nix.bak-20240101T000000Z")));
        assert!(ignore.is_ignored(Utf8Path::new("modules/private")));
        assert!(!ignore.is_ignored(Utf8Path::new("modules/boot.nix")));
    }

    #[test]
    fn collects_only_unignored_nix_files() -> io::Result<()> {
        let d = dirs();
        let files = collect_files(&d.source, &IgnoreList::load(&d.source)?)?;
        assert_eq!(
            files,
            vec![
                Utf8PathBuf::from("configuration.nix"),
                Utf8PathBuf::from("modules/boot.nix"),
            ]
        );
        Ok(())
    }

    #[test]
    fn check_only_never_copies() -> Result<(), Error> {
        let d = dirs();
        let exec = FakeExec::new();
        let flags = SyncFlags {
            check: true,
            force: true,
            ..SyncFlags::default()
        };
        let outcome = run_sync(&exec, &d.source, &d.target, &flags)?;
        assert_eq!(outcome, SyncOutcome::Checked { files: 2 });
        assert!(exec.calls().iter().all(|c| c.starts_with("nix-instantiate --parse")));
        Ok(())
    }

    #[test]
    fn syntax_failure_aborts_before_copy() {
        let d = dirs();
        let exec = FakeExec::new().fail_on(&format!(
            "nix-instantiate --parse {}",
            d.source.join("modules/boot.nix")
        ));
        let err = run_sync(&exec, &d.source, &d.target, &SyncFlags::default()).unwrap_err();
        let Error::Syntax { files } = &err else {
            panic!("expected a syntax error, got {:?}", err);
        };
        assert_eq!(files, &vec![Utf8PathBuf::from("modules/boot.nix")]);
        assert!(!exec.calls().iter().any(|c| c.starts_with("sudo")));
    }

    #[test]
    fn changed_files_are_copied_then_rebuilt() -> Result<(), Error> {
        let d = dirs();
        fs::write(d.target.join("configuration.nix"), "{ }\n")?;
        let exec = FakeExec::new();
        let outcome = run_sync(&exec, &d.source, &d.target, &SyncFlags::default())?;

        assert_eq!(
            outcome,
            SyncOutcome::Rebuilt {
                copied: vec![Utf8PathBuf::from("modules/boot.nix")]
            }
        );
        let calls = exec.calls();
        assert_eq!(
            calls[calls.len() - 2],
            format!(
                "sudo install -D -m 0644 {} {}",
                d.source.join("modules/boot.nix"),
                d.target.join("modules/boot.nix")
            )
        );
        assert_eq!(calls[calls.len() - 1], "sudo nixos-rebuild switch");
        // rebuild output stays on the terminal unless --silent
        let runs = exec.privileged_runs();
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|(_, quiet)| !quiet));
        Ok(())
    }

    #[test]
    fn silent_sync_runs_every_sudo_step_quietly() -> Result<(), Error> {
        let d = dirs();
        let exec = FakeExec::new();
        let flags = SyncFlags {
            silent: true,
            ..SyncFlags::default()
        };
        run_sync(&exec, &d.source, &d.target, &flags)?;
        let runs = exec.privileged_runs();
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|(_, quiet)| *quiet));
        Ok(())
    }

    #[test]
    fn unchanged_tree_skips_rebuild_unless_forced() -> Result<(), Error> {
        let d = dirs();
        fs::create_dir_all(d.target.join("modules"))?;
        fs::copy(d.source.join("configuration.nix"), d.target.join("configuration.nix"))?;
        fs::copy(d.source.join("modules/boot.nix"), d.target.join("modules/boot.nix"))?;

        let exec = FakeExec::new();
        let outcome = run_sync(&exec, &d.source, &d.target, &SyncFlags::default())?;
        assert_eq!(outcome, SyncOutcome::UpToDate);
        assert!(!exec.calls().iter().any(|c| c.starts_with("sudo")));

        let exec = FakeExec::new();
        let flags = SyncFlags {
            force: true,
            silent: true,
            ..SyncFlags::default()
        };
        let outcome = run_sync(&exec, &d.source, &d.target, &flags)?;
        assert_eq!(outcome, SyncOutcome::Rebuilt { copied: vec![] });
        assert_eq!(exec.calls().last().map(String::as_str), Some("sudo nixos-rebuild switch"));
        assert_eq!(
            exec.privileged_runs(),
            vec![("sudo nixos-rebuild switch".to_string(), true)]
        );
        Ok(())
    }

    #[test]
    fn failed_rebuild_is_an_error() {
        let d = dirs();
        let exec = FakeExec::new().fail_on("sudo nixos-rebuild");
        let err = run_sync(&exec, &d.source, &d.target, &SyncFlags::default()).unwrap_err();
        assert!(matches!(err, Error::Rebuild));
    }

    #[test]
    fn failed_copy_stops_before_rebuild() {
        let d = dirs();
        let exec = FakeExec::new().fail_on("sudo install");
        let err = run_sync(&exec, &d.source, &d.target, &SyncFlags::default()).unwrap_err();
        assert!(matches!(err, Error::Copy { .. }));
        assert!(!exec.calls().iter().any(|c| c.contains("nixos-rebuild")));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        let err = run_sync(&FakeExec::new(), dir, dir, &SyncFlags::default()).unwrap_err();
        assert!(matches!(err, Error::NothingToSync(_)));
    }
}
