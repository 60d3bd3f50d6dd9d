use crate::analysis::html::decode_entities;
use regex::Regex;
use std::sync::OnceLock;

fn item_pattern() -> &'static Regex {
    static ITEM: OnceLock<Regex> = OnceLock::new();
    ITEM.get_or_init(|| Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>").expect("item pattern is valid"))
}

fn title_pattern() -> &'static Regex {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    TITLE.get_or_init(|| {
        Regex::new(r"(?s)<title\b[^>]*>\s*(?:<!\[CDATA\[(.*?)\]\]>|(.*?))\s*</title>")
            .expect("title pattern is valid")
    })
}

/// Titles of the `<item>` entries in an RSS document, in feed order.
pub fn extract_item_titles(xml: &str, max_items: usize) -> Vec<String> {
    item_pattern()
        .captures_iter(xml)
        .filter_map(|item| {
            let body = item.get(1)?.as_str();
            let title = title_pattern().captures(body)?;
            match (title.get(1), title.get(2)) {
                (Some(cdata), _) => Some(cdata.as_str().trim().to_string()),
                (None, Some(plain)) => Some(decode_entities(plain.as_str().trim())),
                _ => None,
            }
        })
        .filter(|t| !t.is_empty())
        .take(max_items)
        .collect()
}
