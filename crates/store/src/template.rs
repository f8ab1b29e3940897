use std::collections::HashMap;

use crate::errors::StoreError;

/// Substitute placeholders in a stored URL template.
///
/// Stored templates use the dollar-paren convention, `$(key)s`. They are
/// rewritten to the percent-paren form `%(key)s` before substitution, which
/// keeps templates written against either convention working. A placeholder
/// naming a key absent from `vars` is a hard error, never silently left
/// unexpanded, as is a malformed placeholder.
pub fn render(template: &str, vars: &HashMap<String, String>) -> Result<String, StoreError> {
    let template = template.replace("$(", "%(");
    let mut out = String::with_capacity(template.len());
    let mut rest = template.as_str();
    while let Some(pos) = rest.find("%(") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let close = after.find(')').ok_or_else(|| {
            StoreError::Template(format!("unterminated placeholder in template {template:?}"))
        })?;
        let key = &after[..close];
        if !after[close + 1..].starts_with('s') {
            return Err(StoreError::Template(format!(
                "placeholder for {key:?} must end in ')s' in template {template:?}"
            )));
        }
        let value = vars
            .get(key)
            .ok_or_else(|| StoreError::Template(format!("unknown substitution key {key:?}")))?;
        out.push_str(value);
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
