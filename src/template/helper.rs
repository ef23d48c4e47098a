//! Files that support the dotfiles directory itself rather than the system

/// Standalone equivalent of `nixos-dotscaffold sync`, for machines without the binary
pub const SYNC_SH: &str = r##"#!/usr/bin/env bash
# Copies the nix files next to this script into @targetDir@ and rebuilds.
#
#   --check   only run the syntax check
#   --force   rebuild even when nothing changed
#   --silent  hide rebuild output
set -euo pipefail

src="$(cd "$(dirname "${BASH_SOURCE[0]}")" && pwd)"
target="@targetDir@"
force=0
silent=0
check=0

for arg in "$@"; do
  case "$arg" in
    --force) force=1 ;;
    --silent) silent=1 ;;
    --check) check=1 ;;
    *) echo "unknown option: $arg" >&2; exit 1 ;;
  esac
done

say() { [ "$silent" -eq 1 ] || echo "$@"; }

cd "$src"

# .gitignore patterns, matched against the whole path or any one component of it
ignored=()
if [ -f .gitignore ]; then
  while IFS= read -r line || [ -n "$line" ]; do
    line="${line#"${line%%[![:space:]]*}"}"
    line="${line%"${line##*[![:space:]]}"}"
    case "$line" in ''|'#'*) continue ;; esac
    line="${line#/}"
    line="${line%/}"
    if [ -n "$line" ]; then ignored+=("$line"); fi
  done < .gitignore
fi

is_ignored() {
  local path="$1" p part parts
  for p in ${ignored[@]+"${ignored[@]}"}; do
    # shellcheck disable=SC2053
    [[ $path == $p ]] && return 0
    IFS=/ read -ra parts <<< "$path"
    for part in "${parts[@]}"; do
      [[ $part == $p ]] && return 0
    done
  done
  return 1
}

files=()
while IFS= read -r f; do
  is_ignored "$f" || files+=("$f")
done < <(find . -name '.?*' -prune -o -name '*.nix' -type f -print | sed 's|^\./||' | sort)
if [ "${#files[@]}" -eq 0 ]; then
  echo "no nix files found in $src" >&2
  exit 1
fi

failed=0
for f in "${files[@]}"; do
  if ! nix-instantiate --parse "$f" > /dev/null; then
    echo "syntax error in $f" >&2
    failed=1
  fi
done
if [ "$failed" -ne 0 ]; then
  echo "fix the reported files, then run ./sync.sh --check until it passes" >&2
  exit 1
fi
say "syntax check passed"
[ "$check" -eq 0 ] || exit 0

changed=0
for f in "${files[@]}"; do
  if ! cmp -s "$f" "$target/$f"; then
    sudo install -D -m 0644 "$f" "$target/$f"
    say "copied $f"
    changed=1
  fi
done

if [ "$changed" -eq 0 ] && [ "$force" -eq 0 ]; then
  say "already in sync, skipping rebuild (use --force to rebuild anyway)"
  exit 0
fi

if [ "$silent" -eq 1 ]; then
  sudo nixos-rebuild switch > /dev/null 2>&1
else
  sudo nixos-rebuild switch
fi
"##;

/// Ignore list for the dotfiles directory. `sync` skips whatever matches it.
pub const GITIGNORE: &str = r##"result
result-*
*.bak-*
*.swp
hardware-configuration.nix
"##;
