//! `{{variable}}` substitution in node content, choice text and cues.

use std::sync::LazyLock;

use mechdeck_core::value::Variables;
use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex"));

/// Replaces every `{{name}}` with the current value of `name`.
///
/// Names are matched exactly, without trimming. Unknown names and unclosed
/// braces are left verbatim. A name cannot contain braces, so in `{{ {{a}}`
/// only `{{a}}` is a placeholder.
#[must_use]
pub fn substitute(content: &str, variables: &Variables) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}
