//! Fragments imported by `configuration.nix` in both layouts

pub const BOOT: &str = r##"{ config, pkgs, ... }:

{
  boot.loader.systemd-boot.enable = true;
  boot.loader.efi.canTouchEfiVariables = true;
  boot.tmp.cleanOnBoot = true;
}
"##;

pub const NETWORKING: &str = r##"{ config, pkgs, ... }:

{
  networking.hostName = "@hostname@";
  networking.networkmanager.enable = true;

  networking.firewall.enable = true;
  # networking.firewall.allowedTCPPorts = [ 22 ];
}
"##;

pub const LOCALE: &str = r##"{ config, pkgs, ... }:

{
  time.timeZone = "UTC";

  i18n.defaultLocale = "en_US.UTF-8";
  console.keyMap = "us";
}
"##;

pub const USERS: &str = r##"{ config, pkgs, ... }:

{
  users.users."@username@" = {
    isNormalUser = true;
    home = "@homeDirectory@";
    extraGroups = [ "wheel" "networkmanager" ];
  };

  security.sudo.wheelNeedsPassword = true;
}
"##;
