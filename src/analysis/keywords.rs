use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Filler words that carry no search intent on their own
/// (review, summary, recommendation, price, info, how-to, ...).
const STOP_WORDS: &[&str] = &[
    "후기", "리뷰", "정리", "추천", "가격", "정보", "방법", "구매", "방문", "일상", "기록", "오늘",
    "가능", "완벽", "최고", "포스팅", "블로그",
];

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

fn tokenize(title: &str) -> Vec<String> {
    let without_tags = tag_pattern().replace_all(title, " ");
    let cleaned: String = without_tags
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

fn is_candidate_token(token: &str, stop: &HashSet<&str>) -> bool {
    token.chars().count() >= 2 && !stop.contains(token)
}

/// Count 1-grams and adjacent 2-grams across titles and return the `top_n`
/// most frequent. Ties keep first-seen order.
pub fn extract_candidates_from_titles(titles: &[String], top_n: usize) -> Vec<String> {
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut freq: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    let mut bump = |key: String, freq: &mut HashMap<String, usize>| {
        let count = freq.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    };

    for title in titles {
        let tokens = tokenize(title);

        for token in &tokens {
            if !is_candidate_token(token, &stop) {
                continue;
            }
            if token.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            bump(token.clone(), &mut freq);
        }

        for pair in tokens.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if !is_candidate_token(a, &stop) || !is_candidate_token(b, &stop) {
                continue;
            }
            bump(format!("{a} {b}"), &mut freq);
        }
    }

    let mut ranked = order;
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| freq[b].cmp(&freq[a]));
    ranked.truncate(top_n);
    ranked
}
