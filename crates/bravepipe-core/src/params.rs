//! Query-string construction from named optional values.

/// Ordered query parameters. Unset optional values are omitted, never sent empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn set_opt<V: ToString>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Append to `url`'s query string (percent-encoded), keeping any existing pairs.
    pub fn apply_to(&self, url: &mut url::Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut q = url.query_pairs_mut();
        for (k, v) in &self.pairs {
            q.append_pair(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_unset_values_and_keeps_order() {
        let p = QueryParams::new()
            .set("q", "rust async")
            .set("count", 10)
            .set_opt("offset", Some(0))
            .set_opt::<String>("search_lang", None);
        let keys: Vec<&str> = p.pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["q", "count", "offset"]);
    }

    #[test]
    fn apply_to_percent_encodes() {
        let mut url = url::Url::parse("https://api.example.com/res/v1/web/search").unwrap();
        QueryParams::new()
            .set("q", "a&b c")
            .set("count", 5)
            .apply_to(&mut url);
        assert_eq!(url.query(), Some("q=a%26b+c&count=5"));
    }
}
