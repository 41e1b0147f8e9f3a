//! Placeholder substitution for prompt templates.
//!
//! Tokens are literal markers, not a templating language — no
//! conditionals, no loops. Unmatched tokens are left verbatim: templates
//! ship separately from the code, and a silently-passed-through marker in
//! a prompt is easier to diagnose than a hard failure on a template the
//! operator is mid-way through editing.

/// Serialized JSON of the prior stage's structured response.
pub const SERIALIZED_OBJECT_PLACEHOLDER: &str = "{% SERIALIZED_OBJECT_JSON %}";
/// Bullet list of product names from the prior stage.
pub const PRODUCT_LIST_PLACEHOLDER: &str = "{% PRODUCT_LIST %}";
/// Language the receipt is printed in.
pub const SOURCE_LANG_PLACEHOLDER: &str = "{% SOURCE_LANG %}";
/// Language to translate product names into.
pub const TARGET_LANG_PLACEHOLDER: &str = "{% TARGET_LANG %}";

/// Substitute every occurrence of each token with its replacement text.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (token, replacement) in substitutions {
        rendered = rendered.replace(token, replacement);
    }
    rendered
}
