use url::form_urlencoded;

pub const SOURCE_PARAM: &str = "source";
pub const SOURCE_COOKIE_NAME: &str = "opendebates.source";

/// Value of the `source` parameter in a query string (with or without the
/// leading `?`). `+` decodes to a space.
pub fn source_from_query(query: &str) -> Option<String> {
    let query = query.trim_start_matches('?');
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == SOURCE_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Site-wide cookie remembering where a visitor came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCookie {
    pub value: String,
}

impl SourceCookie {
    pub fn from_query(query: &str) -> Option<Self> {
        source_from_query(query).map(|value| Self { value })
    }

    /// `Set-Cookie` style rendering, scoped to the whole site.
    pub fn to_header_value(&self) -> String {
        let encoded: String = form_urlencoded::byte_serialize(self.value.as_bytes()).collect();
        format!("{}={}; Path=/", SOURCE_COOKIE_NAME, encoded)
    }
}
