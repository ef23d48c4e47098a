use camino::{Utf8Path, Utf8PathBuf};

use super::{parsers, Dirs, InitArgs, SubCommand, SyncArgs};
use crate::{
    channel,
    error::Error,
    exec::Exec,
    scaffold::{self, Report, Written},
    sync::{self, SyncFlags, SyncOutcome},
    template::Context,
    utils,
};

impl SubCommand {
    pub fn run(self, exec: &impl Exec) -> Result<(), Error> {
        match self {
            Self::Init(args) => args.run(exec),
            Self::Sync(args) => args.run(exec),
            Self::Probe { json } => {
                let probe = channel::check_home_manager(exec)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&probe)?);
                } else {
                    println!("{}", probe);
                }
                Ok(())
            }
        }
    }
}

impl Dirs {
    /// `--dir`, then `$NIXOS_DOTFILES_DIR`, then `~/.config/nixos`
    fn dotfiles_dir(&self) -> Result<Utf8PathBuf, Error> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(utils::default_dotfiles_dir()?),
        }
    }
}

impl InitArgs {
    fn run(self, exec: &impl Exec) -> Result<(), Error> {
        let dir = self.dirs.dotfiles_dir()?;
        let ctx = self.context(&dir)?;
        log::trace!("template context: {:?}", ctx);

        let channel_url = (!self.no_channel).then_some(self.channel_url.as_str());
        let report = scaffold::scaffold(exec, &dir, &ctx, channel_url, self.overwrite)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }

    fn context(&self, dir: &Utf8Path) -> Result<Context, Error> {
        // explicit values went through the same parsers already; defaults have not
        let username = match &self.user {
            Some(u) => u.clone(),
            None => parsers::user_name_parse(&utils::current_user()?).map_err(Error::Invalid)?,
        };
        let hostname = match &self.hostname {
            Some(h) => h.clone(),
            None => parsers::hostname_parse(&utils::current_hostname()?).map_err(Error::Invalid)?,
        };
        // home-manager wants the real home of the configured user, not necessarily ours
        let home_directory = if self.user.is_some() {
            format!("/home/{}", username)
        } else {
            utils::home_directory()?.into_string()
        };
        Ok(Context {
            username,
            hostname,
            state_version: self.state_version.clone(),
            home_directory,
            dotfiles_dir: dir.to_string(),
            target_dir: self.dirs.target.to_string(),
        })
    }
}

impl SyncArgs {
    fn run(self, exec: &impl Exec) -> Result<(), Error> {
        let source = self.dirs.dotfiles_dir()?;
        let flags = SyncFlags {
            force: self.force,
            silent: self.silent,
            check: self.check,
        };
        log::info!("syncing {} -> {} with {:?}", source, self.dirs.target, flags);
        match sync::run_sync(exec, &source, &self.dirs.target, &flags)? {
            SyncOutcome::Rebuilt { copied } if !flags.silent => {
                println!("rebuilt with {} updated file(s)", copied.len());
            }
            outcome => log::debug!("sync finished: {:?}", outcome),
        }
        Ok(())
    }
}

fn print_report(report: &Report) {
    println!("wrote the {} layout to {}", report.variant, report.dir);
    for (path, written) in &report.files {
        let action = match written {
            Written::Created => "created".to_string(),
            Written::Unchanged => "unchanged".to_string(),
            Written::Skipped => "skipped (exists)".to_string(),
            Written::Replaced { backup } => format!("replaced (old copy at {})", backup),
        };
        println!("  {:<28} {}", path, action);
    }
    if report.kept_configuration() {
        println!();
        println!(
            "warning: configuration.nix was kept as is and may not match the {} layout; rerun with --overwrite to replace it",
            report.variant
        );
    }
    println!();
    println!("next steps:");
    println!("  1. review {}", report.dir.join("configuration.nix"));
    println!("  2. run {} --check", report.dir.join("sync.sh"));
    println!("  3. run {} to copy the files and rebuild", report.dir.join("sync.sh"));
}
