//! Defensive accessors for Notion page property values.
//!
//! A page looks like `{"id": "...", "properties": {"Name": {"type": "title",
//! "title": [...]}, ...}}`. Every accessor here degrades to `None` or an empty
//! string when a level is missing or has the wrong shape.

use serde_json::Value;

/// The page's stable identifier.
pub fn page_id(page: &Value) -> Option<String> {
    page.get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
}

fn property<'a>(page: &'a Value, name: &str) -> Option<&'a Value> {
    page.get("properties")?.get(name)
}

/// Concatenate the plain text of a rich-text run array.
pub fn plain_text(runs: &Value) -> String {
    runs.as_array()
        .map(|runs| {
            runs.iter()
                .filter_map(|run| {
                    run.get("plain_text")
                        .and_then(Value::as_str)
                        .or_else(|| run.get("text")?.get("content")?.as_str())
                })
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Text of the page's title property, located by type rather than name.
pub fn title(page: &Value) -> String {
    let Some(props) = page.get("properties").and_then(Value::as_object) else {
        return String::new();
    };

    props
        .values()
        .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        .and_then(|p| p.get("title"))
        .map(plain_text)
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Name of a select-like property: `select`, `status`, or the first
/// `multi_select` option.
pub fn select_name(page: &Value, name: &str) -> Option<String> {
    let prop = property(page, name)?;
    let option = prop
        .get("select")
        .filter(|v| !v.is_null())
        .or_else(|| prop.get("status").filter(|v| !v.is_null()))
        .or_else(|| prop.get("multi_select")?.as_array()?.first())?;

    option
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Numeric property value. Null, missing, or non-finite values are `None`.
pub fn number(page: &Value, name: &str) -> Option<f64> {
    property(page, name)?
        .get("number")?
        .as_f64()
        .filter(|n| n.is_finite())
}

/// Start of a date property, kept as the raw string Notion returned.
pub fn date_start(page: &Value, name: &str) -> Option<String> {
    property(page, name)?
        .get("date")?
        .get("start")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Text of a free-form property: rich text, or a select option name.
pub fn text(page: &Value, name: &str) -> Option<String> {
    let prop = property(page, name)?;
    let from_rich_text = prop
        .get("rich_text")
        .map(plain_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    from_rich_text.or_else(|| select_name(page, name))
}
