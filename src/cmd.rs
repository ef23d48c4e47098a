use camino::Utf8PathBuf;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{channel::DEFAULT_CHANNEL_URL, utils};

mod parsers;
/// Implementations for carrying out the various tasks
mod handlers;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// More log output. Repeat for more detail (`-vvv` traces every command run)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: SubCommand,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Writes a dotfiles directory: system config, home-manager config and modular fragments.
    ///
    /// Installs the home-manager channel if it is missing. When that is not possible, a
    /// system-only layout is written instead.
    Init(InitArgs),
    /// Syntax-checks the dotfiles, copies changed files into the system directory and runs
    /// `nixos-rebuild switch`.
    Sync(SyncArgs),
    /// Reports whether home-manager resolves on the nix search path
    Probe {
        #[clap(long)]
        /// Outputs the result in json format
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Dirs {
    /// The dotfiles directory. Defaults to `~/.config/nixos`
    #[clap(long, env = "NIXOS_DOTFILES_DIR")]
    pub dir: Option<Utf8PathBuf>,
    /// System configuration directory that `sync` copies into
    #[clap(long, default_value_t = Utf8PathBuf::from(utils::DEFAULT_FILE_DIR))]
    pub target: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[clap(flatten)]
    pub dirs: Dirs,
    /// User the configuration is written for. Defaults to the invoking user
    #[clap(long)]
    #[arg(value_parser = parsers::user_name_parse)]
    pub user: Option<String>,
    /// Defaults to the current hostname
    #[clap(long)]
    #[arg(value_parser = parsers::hostname_parse)]
    pub hostname: Option<String>,
    /// Value for `system.stateVersion` and `home.stateVersion`
    #[clap(long, default_value = utils::DEFAULT_STATE_VERSION)]
    #[arg(value_parser = parsers::state_version_parse)]
    pub state_version: String,
    /// Tarball registered as the `home-manager` channel when it is missing
    #[clap(long, default_value = DEFAULT_CHANNEL_URL)]
    #[arg(value_parser = parsers::channel_url_parse)]
    pub channel_url: String,
    /// Never touch channels. Writes the system-only layout if home-manager is missing
    #[clap(long)]
    pub no_channel: bool,
    /// Replace files that already exist, keeping a timestamped backup
    #[clap(long)]
    pub overwrite: bool,
    /// Outputs the report in json format
    #[clap(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct SyncArgs {
    #[clap(flatten)]
    pub dirs: Dirs,
    /// Rebuild even when no file changed
    #[clap(long)]
    pub force: bool,
    /// Hide rebuild output and progress messages
    #[clap(long)]
    pub silent: bool,
    /// Only run the syntax check
    #[clap(long)]
    pub check: bool,
}
