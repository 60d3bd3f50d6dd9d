use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

fn entity_pattern() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]{1,6})|#([0-9]{1,7})|(quot|apos|lt|gt|amp));")
            .expect("entity pattern is valid")
    })
}

/// Remove markup from a provider snippet and decode the handful of entities
/// the search API emits (`<b>` highlight tags, quotes, ampersands).
pub fn strip_markup(input: &str) -> String {
    let without_tags = tag_pattern().replace_all(input, "");
    decode_entities(&without_tags)
}

/// Decodes the named XML entities and numeric character references
/// (`&#8217;`, `&#x2019;`) in one pass, so `&amp;lt;` stays a literal `&lt;`.
pub fn decode_entities(input: &str) -> String {
    entity_pattern()
        .replace_all(input, |caps: &regex::Captures| {
            let decoded = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(hex), _, _) => u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32),
                (_, Some(dec), _) => dec.as_str().parse::<u32>().ok().and_then(char::from_u32),
                (_, _, Some(name)) => match name.as_str() {
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    _ => Some('&'),
                },
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
