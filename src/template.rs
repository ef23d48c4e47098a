use camino::Utf8Path;
use serde::Serialize;

mod fallback;
mod helper;
mod home;
mod system;

/// Which configuration layout gets written. Chosen from whether home-manager is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// `configuration.nix` imports `<home-manager/nixos>`; user config lives in `home.nix`
    HomeManager,
    /// System-only layout, user tooling installed through `environment.systemPackages`
    Fallback,
}

/// An embedded file, with `@placeholder@`s still in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFile {
    /// Relative to the dotfiles directory
    pub path: &'static str,
    pub body: &'static str,
    pub executable: bool,
}

impl TemplateFile {
    const fn plain(path: &'static str, body: &'static str) -> Self {
        Self {
            path,
            body,
            executable: false,
        }
    }
}

/// Values substituted into the templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub username: String,
    pub hostname: String,
    pub state_version: String,
    pub home_directory: String,
    /// Where the scaffold is written
    pub dotfiles_dir: String,
    /// Where `sync` copies the files to, normally `/etc/nixos`
    pub target_dir: String,
}

impl Context {
    pub fn render(&self, body: &str) -> String {
        body.replace("@username@", &self.username)
            .replace("@hostname@", &self.hostname)
            .replace("@stateVersion@", &self.state_version)
            .replace("@homeDirectory@", &self.home_directory)
            .replace("@dotfilesDir@", &self.dotfiles_dir)
            .replace("@targetDir@", &self.target_dir)
    }
}

/// Every file of a variant: the shared system fragments, the sync helper and its ignore list,
/// then the variant-specific files.
pub fn bundle(variant: Variant) -> Vec<TemplateFile> {
    let mut files = vec![
        TemplateFile::plain("modules/boot.nix", system::BOOT),
        TemplateFile::plain("modules/networking.nix", system::NETWORKING),
        TemplateFile::plain("modules/locale.nix", system::LOCALE),
        TemplateFile::plain("modules/users.nix", system::USERS),
        TemplateFile {
            path: "sync.sh",
            body: helper::SYNC_SH,
            executable: true,
        },
        TemplateFile::plain(".gitignore", helper::GITIGNORE),
    ];
    match variant {
        Variant::HomeManager => files.extend([
            TemplateFile::plain("configuration.nix", home::CONFIGURATION),
            TemplateFile::plain("home.nix", home::HOME),
            TemplateFile::plain("home/shell.nix", home::SHELL),
            TemplateFile::plain("home/git.nix", home::GIT),
            TemplateFile::plain("home/packages.nix", home::PACKAGES),
        ]),
        Variant::Fallback => files.extend([
            TemplateFile::plain("configuration.nix", fallback::CONFIGURATION),
            TemplateFile::plain("modules/user-packages.nix", fallback::USER_PACKAGES),
        ]),
    }
    files
}

/// Name of the ignore list inside the dotfiles directory, also honoured by `sync`
pub const IGNORE_FILE: &str = ".gitignore";

/// Whether `path` is something the sync helper carries over to the system directory
pub fn is_synced(path: &Utf8Path) -> bool {
    path.extension() == Some("nix")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> Context {
        Context {
            username: "alice".into(),
            hostname: "lappy".into(),
            state_version: "24.05".into(),
            home_directory: "/home/alice".into(),
            dotfiles_dir: "/home/alice/.config/nixos".into(),
            target_dir: "/etc/nixos".into(),
        }
    }

    #[test]
    fn render_fills_every_placeholder() {
        let ctx = ctx();
        for variant in [Variant::HomeManager, Variant::Fallback] {
            for file in bundle(variant) {
                let out = ctx.render(file.body);
                for placeholder in [
                    "@username@",
                    "@hostname@",
                    "@stateVersion@",
                    "@homeDirectory@",
                    "@dotfilesDir@",
                    "@targetDir@",
                ] {
                    assert!(
                        !out.contains(placeholder),
                        "{} left {} in {}",
                        variant,
                        placeholder,
                        file.path
                    );
                }
            }
        }
    }

    #[test]
    fn only_home_manager_variant_mentions_home_manager() {
        let ctx = ctx();
        let mentions = |variant| {
            bundle(variant)
                .iter()
                .filter(|f| is_synced(Utf8Path::new(f.path)))
                .any(|f| ctx.render(f.body).contains("home-manager"))
        };
        assert!(mentions(Variant::HomeManager));
        assert!(!mentions(Variant::Fallback));
    }

    #[test]
    fn bundles_share_helper_files() {
        let paths = |variant| bundle(variant).iter().map(|f| f.path).collect::<Vec<_>>();
        let hm = paths(Variant::HomeManager);
        let fb = paths(Variant::Fallback);
        for shared in ["sync.sh", ".gitignore", "configuration.nix", "modules/users.nix"] {
            assert!(hm.contains(&shared));
            assert!(fb.contains(&shared));
        }
        assert!(hm.contains(&"home.nix"));
        assert!(!fb.contains(&"home.nix"));
        assert!(fb.contains(&"modules/user-packages.nix"));
    }

    #[test]
    fn only_sync_helper_is_executable() {
        let exec = bundle(Variant::Fallback)
            .into_iter()
            .filter(|f| f.executable)
            .map(|f| f.path)
            .collect::<Vec<_>>();
        assert_eq!(exec, vec!["sync.sh"]);
    }

    #[test]
    fn user_name_lands_in_users_module() {
        let out = ctx().render(system::USERS);
        assert!(out.contains(r#"users.users."alice" = {"#));
    }

    #[test]
    fn dotted_user_name_stays_one_attribute() {
        let ctx = Context {
            username: "first.last".into(),
            ..ctx()
        };
        assert!(ctx
            .render(system::USERS)
            .contains(r#"users.users."first.last" = {"#));
        assert!(ctx
            .render(home::CONFIGURATION)
            .contains(r#"home-manager.users."first.last" = import ./home.nix;"#));
        assert!(ctx
            .render(fallback::USER_PACKAGES)
            .contains(r#"users.users."first.last".packages"#));
    }

    #[test]
    fn sync_helper_takes_exclusions_from_ignore_file() {
        assert!(helper::SYNC_SH.contains("done < .gitignore"));
        assert!(!helper::SYNC_SH.contains("hardware-configuration"));
        // the shipped ignore file is what keeps the hardware scan out of either sync
        assert!(helper::GITIGNORE.lines().any(|l| l == "hardware-configuration.nix"));
        let native = crate::sync::IgnoreList::parse(helper::GITIGNORE);
        assert!(native.is_ignored(Utf8Path::new("hardware-configuration.nix")));
        assert!(native.is_ignored(Utf8Path::new("result/etc/nixos.nix")));
    }

    #[test]
    fn variant_names_are_kebab_case() {
        assert_eq!(Variant::HomeManager.to_string(), "home-manager");
        assert_eq!(Variant::Fallback.to_string(), "fallback");
    }
}
