//! URL query-string construction for provider requests.

use tracing::debug;

/// Builds `base?key1=value1&key2=value2` from `params`.
///
/// Keys and values are percent-encoded; parameters appear in the iteration
/// order of `params`, so pass a `BTreeMap` for a sorted result. A `base` that
/// already carries a query gets the new parameters appended with `&`.
pub fn build_query_string<I, K, V>(base: Option<&str>, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let base = base.unwrap_or("");
    let query = params
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let result = if query.is_empty() {
        base.to_owned()
    } else if base.contains('?') {
        let separator = if base.ends_with('?') || base.ends_with('&') {
            ""
        } else {
            "&"
        };
        format!("{base}{separator}{query}")
    } else {
        format!("{base}?{query}")
    };

    debug!(url = %result, "built provider query string");
    result
}
