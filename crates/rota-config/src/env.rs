use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{\{\s*(?P<scope>[A-Za-z0-9_]+)\.(?P<name>[A-Za-z0-9_]+)\s*(?:\|\s*default\(\s*"(?P<default>[^"]*)"\s*\))?\s*\}\}"#,
    )
    .expect("placeholder pattern must compile")
});

/// Substitute `{{ env.NAME }}` and `{{ env.NAME | default("x") }}` in raw config text
///
/// Comment lines are copied untouched so documented examples never need
/// their variables set.
pub(crate) fn expand_env(raw: &str) -> anyhow::Result<String> {
    raw.split_inclusive('\n').map(expand_line).collect()
}

fn expand_line(line: &str) -> anyhow::Result<Cow<'_, str>> {
    if line.trim_start().starts_with('#') {
        return Ok(Cow::Borrowed(line));
    }

    let mut failure: Option<String> = None;

    let expanded = PLACEHOLDER.replace_all(line, |caps: &Captures<'_>| {
        let scope = &caps["scope"];
        let name = &caps["name"];

        if scope != "env" {
            failure.get_or_insert_with(|| format!("unsupported placeholder scope `{scope}.{name}`, expected `env.`"));
            return String::new();
        }

        match (std::env::var(name), caps.name("default")) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_owned(),
            (Err(_), None) => {
                failure.get_or_insert_with(|| format!("environment variable `{name}` is not set"));
                String::new()
            }
        }
    });

    match failure {
        Some(reason) => anyhow::bail!(reason),
        None => Ok(expanded),
    }
}
