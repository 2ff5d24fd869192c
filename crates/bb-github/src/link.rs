use url::Url;

/// Extracts the page number of the `rel="next"` entry of a `Link` header.
pub fn next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts
            .next()?
            .trim()
            .strip_prefix('<')?
            .strip_suffix('>')?;
        if !parts.any(|param| param.trim() == r#"rel="next""#) {
            return None;
        }
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_page_from_middle_page() {
        let link = r#"<https://api.github.com/repositories/16563587/pulls?state=all&page=1>; rel="prev", <https://api.github.com/repositories/16563587/pulls?state=all&page=3>; rel="next", <https://api.github.com/repositories/16563587/pulls?state=all&page=412>; rel="last""#;
        assert_eq!(next_page(link), Some(3));
    }

    #[test]
    fn test_no_next_on_last_page() {
        let link = r#"<https://api.github.com/repositories/1/pulls?page=1>; rel="first", <https://api.github.com/repositories/1/pulls?page=4>; rel="prev""#;
        assert_eq!(next_page(link), None);
        assert_eq!(next_page(""), None);
    }

    #[test]
    fn test_malformed_entries_are_ignored() {
        assert_eq!(next_page(r#"https://x/?page=2; rel="next""#), None);
        assert_eq!(next_page(r#"<https://x/?page=two>; rel="next""#), None);
    }
}
