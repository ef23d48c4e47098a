//! Layout used when `<home-manager>` resolves

pub const CONFIGURATION: &str = r##"# Edit this file, then run ./sync.sh to apply it.
{ config, pkgs, ... }:

{
  imports = [
    ./hardware-configuration.nix
    <home-manager/nixos>
    ./modules/boot.nix
    ./modules/networking.nix
    ./modules/locale.nix
    ./modules/users.nix
  ];

  home-manager.useGlobalPkgs = true;
  home-manager.useUserPackages = true;
  home-manager.users."@username@" = import ./home.nix;

  nix.settings.experimental-features = [ "nix-command" ];
  nixpkgs.config.allowUnfree = false;

  environment.systemPackages = with pkgs; [
    vim
    git
  ];

  system.stateVersion = "@stateVersion@";
}
"##;

pub const HOME: &str = r##"{ config, pkgs, ... }:

{
  imports = [
    ./home/shell.nix
    ./home/git.nix
    ./home/packages.nix
  ];

  home.username = "@username@";
  home.homeDirectory = "@homeDirectory@";

  programs.home-manager.enable = true;

  home.stateVersion = "@stateVersion@";
}
"##;

pub const SHELL: &str = r##"{ config, pkgs, ... }:

{
  programs.bash = {
    enable = true;
    shellAliases = {
      ll = "ls -l";
      rebuild = "@dotfilesDir@/sync.sh";
    };
  };

  programs.direnv.enable = true;
}
"##;

pub const GIT: &str = r##"{ config, pkgs, ... }:

{
  programs.git = {
    enable = true;
    userName = "@username@";
    # userEmail = "@username@@@hostname@";
    extraConfig.init.defaultBranch = "main";
  };
}
"##;

pub const PACKAGES: &str = r##"{ config, pkgs, ... }:

{
  home.packages = with pkgs; [
    ripgrep
    fd
    jq
    htop
  ];
}
"##;
