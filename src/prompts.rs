//! Instruction templates wrapped around user text before it reaches the
//! image model.

pub const GENERATE: &str = include_str!("../data/prompts/generate.txt");
pub const EDIT: &str = include_str!("../data/prompts/edit.txt");
pub const KEY_CHECK: &str = include_str!("../data/prompts/key_check.txt");

/// Substitute each `{{name}}` placeholder with its value. Unknown
/// placeholders are left in place.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.trim_end().to_string(), |text, (name, value)| {
        text.replace(&format!("{{{{{}}}}}", name), value)
    })
}
