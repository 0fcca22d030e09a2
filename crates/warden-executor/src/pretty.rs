//! Bounded pretty-printing of sandbox results for the feedback message sent
//! back to the LLM (§9 "Rendering back to the LLM").

use warden_ast::Value;

const MAX_LIST_ELEMENTS: usize = 1000;
const MAX_TEXT_CHARS: usize = 2000;

/// Render `value` for inclusion in a feedback message, truncating list
/// contents at [`MAX_LIST_ELEMENTS`] and the whole rendered text at
/// [`MAX_TEXT_CHARS`].
pub fn pretty_print(value: &Value) -> String {
    let rendered = render(value);
    truncate_chars(&rendered, MAX_TEXT_CHARS)
}

fn render(value: &Value) -> String {
    match value {
        Value::List(items) => {
            let truncated = items.len() > MAX_LIST_ELEMENTS;
            let shown: Vec<String> = items.iter().take(MAX_LIST_ELEMENTS).map(render).collect();
            let mut out = format!("[{}", shown.join(", "));
            if truncated {
                out.push_str(&format!(", ...({} more)", items.len() - MAX_LIST_ELEMENTS));
            }
            out.push(']');
            out
        }
        other => other.to_string(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let truncated: String = s.chars().take(max).collect();
    format!("{truncated}... (truncated)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_scalars_directly() {
        assert_eq!(pretty_print(&Value::Int(3)), "3");
        assert_eq!(pretty_print(&Value::Str("hi".into())), "hi");
    }

    #[test]
    fn truncates_long_lists() {
        let items: Vec<Value> = (0..1500).map(Value::Int).collect();
        let rendered = pretty_print(&Value::List(items));
        assert!(rendered.contains("more)"));
    }

    #[test]
    fn short_lists_are_not_truncated() {
        let items = vec![Value::Int(1), Value::Int(2)];
        let rendered = pretty_print(&Value::List(items));
        assert_eq!(rendered, "[1, 2]");
    }

    #[test]
    fn truncates_long_text() {
        let long = Value::Str("x".repeat(3000));
        let rendered = pretty_print(&long);
        assert!(rendered.len() < 3000);
        assert!(rendered.ends_with("(truncated)"));
    }
}
