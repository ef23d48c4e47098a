//! System-only layout, written when `<home-manager>` is unavailable and could not be installed

pub const CONFIGURATION: &str = r##"# Edit this file, then run ./sync.sh to apply it.
{ config, pkgs, ... }:

{
  imports = [
    ./hardware-configuration.nix
    ./modules/boot.nix
    ./modules/networking.nix
    ./modules/locale.nix
    ./modules/users.nix
    ./modules/user-packages.nix
  ];

  nix.settings.experimental-features = [ "nix-command" ];
  nixpkgs.config.allowUnfree = false;

  system.stateVersion = "@stateVersion@";
}
"##;

pub const USER_PACKAGES: &str = r##"{ config, pkgs, ... }:

{
  users.users."@username@".packages = with pkgs; [
    ripgrep
    fd
    jq
    htop
  ];

  environment.systemPackages = with pkgs; [
    vim
    git
  ];

  programs.bash.shellAliases = {
    ll = "ls -l";
    rebuild = "@dotfilesDir@/sync.sh";
  };

  programs.git = {
    enable = true;
    config.init.defaultBranch = "main";
  };
}
"##;
