//! Presentation of a lookup result.
//!
//! The index only returns a sorted tag list; these renderers turn it into the
//! formats the service hands out.

use std::borrow::Cow;
use std::fmt::Write;

use serde_json::Value;

/// The tag list as a JSON array of strings.
pub fn tags_json(tags: &[&str]) -> String {
    Value::from(tags.iter().map(|t| Value::from(*t)).collect::<Vec<_>>()).to_string()
}

/// One line per address: `addr: tag, tag, ...` (`-` when nothing matched).
pub fn tags_text(addr: &str, tags: &[&str]) -> String {
    if tags.is_empty() {
        format!("{addr}: -")
    } else {
        format!("{addr}: {}", tags.join(", "))
    }
}

/// A two-column HTML table: the address spans one row per matching tag.
///
/// Both the address and the tags are escaped, so tags holding markup are
/// shown verbatim instead of being interpreted.
pub fn tags_html(addr: &str, tags: &[&str]) -> String {
    let first = tags.first().copied().unwrap_or("");
    let rowspan = tags.len().max(1);

    let mut html = String::new();
    html.push_str("<table border=\"1\">\n");
    html.push_str("  <tr>\n    <th>IP address</th>\n    <th>Matching tags</th>\n  </tr>\n");
    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "  <tr>\n    <td rowspan=\"{rowspan}\">{}</td>\n    <td>{}</td>\n  </tr>\n",
        escape_html(addr),
        escape_html(first),
    );
    for tag in tags.iter().skip(1) {
        let _ = writeln!(html, "  <tr><td>{}</td></tr>", escape_html(tag));
    }
    html.push_str("</table>\n");
    html
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
