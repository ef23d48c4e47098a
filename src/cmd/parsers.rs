/// `YY.MM`, e.g. `24.05`. Only the shape is checked; the evaluator decides what it supports.
pub(super) fn state_version_parse(val: &str) -> Result<String, String> {
    let valid = val.split_once('.').is_some_and(|(year, month)| {
        year.len() == 2
            && month.len() == 2
            && year.bytes().all(|b| b.is_ascii_digit())
            && month.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
    });
    if valid {
        Ok(val.to_string())
    } else {
        Err(format!("expected a release such as `24.05`, got `{}`", val))
    }
}

/// Login names as `useradd` accepts them: a letter or `_`, then letters, digits, `_`, `.`, `-`,
/// optionally ending in `$`. At most 32 bytes.
pub(super) fn user_name_parse(val: &str) -> Result<String, String> {
    let body = val.strip_suffix('$').unwrap_or(val);
    let mut chars = body.chars();
    let valid = val.len() <= 32
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(val.to_string())
    } else {
        Err(format!("not a usable user name: `{}`", val))
    }
}

/// What `networking.hostName` accepts: 1 to 63 letters, digits, `-` or `_`, starting and
/// ending with a letter or digit
pub(super) fn hostname_parse(val: &str) -> Result<String, String> {
    let valid = (1..=63).contains(&val.len())
        && val.starts_with(|c: char| c.is_ascii_alphanumeric())
        && val.ends_with(|c: char| c.is_ascii_alphanumeric())
        && val
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(val.to_string())
    } else {
        Err(format!("not a valid NixOS hostname: `{}`", val))
    }
}

/// Anything `nix-channel --add` would fetch: a url with a scheme
pub(super) fn channel_url_parse(val: &str) -> Result<String, String> {
    match val.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => Ok(val.to_string()),
        _ => Err(format!("not a url: `{}`", val)),
    }
}
