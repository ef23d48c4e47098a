use std::io;

use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("syntax check failed for: {}", display_list(.files))]
    Syntax { files: Vec<Utf8PathBuf> },

    #[error("no nix files found in {0}")]
    NothingToSync(Utf8PathBuf),

    #[error("could not copy {file} to {target}")]
    Copy { file: Utf8PathBuf, target: Utf8PathBuf },

    #[error("`nixos-rebuild switch` exited unsuccessfully")]
    Rebuild,

    #[error("{0}")]
    Invalid(String),
}

impl Error {
    /// One-line remediation printed after the error itself
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Io(_) | Self::Json(_) => None,
            Self::Spawn { .. } => Some("make sure the nix tools and `sudo` are on your PATH"),
            Self::Syntax { .. } => Some(
                "fix the reported files, then run `nixos-dotscaffold sync --check` until it passes",
            ),
            Self::NothingToSync(_) => Some("run `nixos-dotscaffold init` first, or pass `--dir`"),
            Self::Copy { .. } => Some("check that you may run `sudo install`, then retry"),
            Self::Rebuild => Some(
                "the files were copied; inspect the output above and run `sudo nixos-rebuild switch --show-trace`",
            ),
            Self::Invalid(_) => Some("see `nixos-dotscaffold --help`"),
        }
    }
}

fn display_list(files: &[Utf8PathBuf]) -> String {
    files
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
