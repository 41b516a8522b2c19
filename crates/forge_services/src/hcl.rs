//! Small helpers for rendering HCL fragments.

use std::collections::BTreeMap;

/// Quote and escape a string literal.
pub fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("${", "$${");
    format!("\"{}\"", escaped)
}

/// `["a", "b"]`
pub fn string_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| quote(i.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

/// A map literal, one entry per line, indented by `indent` spaces.
pub fn map_block(entries: &BTreeMap<String, String>, indent: usize) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }

    let pad = " ".repeat(indent + 2);
    let width = entries.keys().map(|k| k.len()).max().unwrap_or(0);
    let mut out = String::from("{\n");
    for (key, value) in entries {
        out.push_str(&format!(
            "{}{:width$} = {}\n",
            pad,
            key,
            quote(value),
            width = width
        ));
    }
    out.push_str(&" ".repeat(indent));
    out.push('}');
    out
}

/// Turn an arbitrary name into a Terraform identifier.
pub fn identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Header comment placed at the top of every generated Terraform file.
pub fn header(title: &str, project_id: &str, environment: &str) -> String {
    format!(
        "# {title}\n#\n# Project:     {project}\n# Environment: {env}\n# Generated by stackforge. Edits may be overwritten on regeneration.\n",
        title = title,
        project = project_id,
        env = environment
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("${var}"), "\"$${var}\"");
    }

    #[test]
    fn test_string_list() {
        assert_eq!(string_list(&["80", "443"]), "[\"80\", \"443\"]");
        assert_eq!(string_list::<&str>(&[]), "[]");
    }

    #[test]
    fn test_map_block_aligned() {
        let mut labels = BTreeMap::new();
        labels.insert("team".to_string(), "core".to_string());
        labels.insert("environment".to_string(), "dev".to_string());

        let block = map_block(&labels, 2);
        assert_eq!(
            block,
            "{\n    environment = \"dev\"\n    team        = \"core\"\n  }"
        );
        assert_eq!(map_block(&BTreeMap::new(), 0), "{}");
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("api-gateway"), "api_gateway");
        assert_eq!(identifier("9lives"), "_9lives");
        assert_eq!(identifier("My.Bucket"), "my_bucket");
    }
}
