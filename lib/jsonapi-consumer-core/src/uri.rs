//! Request URI composition.
//!
//! `/path[/id][/relation...][?query]`, resolved against a base URI.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::Result;

/// Characters escaped in an id or relationship segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Build the URI of a resource request.
///
/// - `path` is the resource path; it may contain `/` (e.g. `articles/1`),
///   leading and trailing slashes are ignored.
/// - `id`, when given, is appended as one escaped segment.
/// - `relations` are appended in order, each as one escaped segment.
/// - `query` pairs are form-encoded in iteration order, duplicates and empty
///   values included.
///
/// The result replaces the path of `base` (like an absolute-path reference),
/// keeping its scheme, host and port.
///
/// # Errors
///
/// Returns an error if the joined URI is not valid.
///
/// # Example
///
/// ```
/// use jsonapi_consumer_core::compose;
///
/// let base = url::Url::parse("https://api.test").unwrap();
/// let url = compose(&base, "articles", Some("1"), ["comments"], [("sort", "-created")]).unwrap();
/// assert_eq!(url.as_str(), "https://api.test/articles/1/comments?sort=-created");
/// ```
pub fn compose<R, Q, K, V>(
    base: &Url,
    path: &str,
    id: Option<&str>,
    relations: R,
    query: Q,
) -> Result<Url>
where
    R: IntoIterator,
    R::Item: AsRef<str>,
    Q: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut target = format!("/{}", path.trim_matches('/'));
    if let Some(id) = id {
        push_segment(&mut target, id);
    }
    for relation in relations {
        push_segment(&mut target, relation.as_ref());
    }

    let mut url = base.join(&target)?;

    let mut pairs = query.into_iter().peekable();
    if pairs.peek().is_some() {
        let mut serializer = url.query_pairs_mut();
        for (name, value) in pairs {
            serializer.append_pair(name.as_ref(), value.as_ref());
        }
    }

    Ok(url)
}

fn push_segment(target: &mut String, segment: &str) {
    target.push('/');
    target.extend(utf8_percent_encode(segment, SEGMENT));
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const NO_RELATIONS: [&str; 0] = [];
    const NO_QUERY: [(&str, &str); 0] = [];

    fn base() -> Url {
        Url::parse("https://api.test").expect("valid URL")
    }

    #[test]
    fn base_path_only() {
        let url = compose(&base(), "articles", None, NO_RELATIONS, NO_QUERY).expect("compose");
        assert_eq!(url.as_str(), "https://api.test/articles");
        assert!(url.query().is_none());
    }

    #[test]
    fn leading_slash_is_ignored() {
        let url = compose(&base(), "/articles/", Some("1"), NO_RELATIONS, NO_QUERY)
            .expect("compose");
        assert_eq!(url.as_str(), "https://api.test/articles/1");
    }

    #[test]
    fn relations_keep_order() {
        let url = compose(
            &base(),
            "articles/1",
            None,
            ["author", "comments"],
            NO_QUERY,
        )
        .expect("compose");
        assert_eq!(url.path(), "/articles/1/author/comments");
    }

    #[test]
    fn relations_come_before_query() {
        let url = compose(
            &base(),
            "articles",
            Some("1"),
            vec!["comments".to_string()],
            [("page[size]", "5")],
        )
        .expect("compose");
        assert_eq!(
            url.as_str(),
            "https://api.test/articles/1/comments?page%5Bsize%5D=5"
        );
    }

    #[test]
    fn query_round_trips() {
        let query = HashMap::from([("sort", "name"), ("page[size]", "10")]);

        let url = compose(&base(), "articles", None, NO_RELATIONS, &query).expect("compose");

        let parsed: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("sort").map(String::as_str), Some("name"));
        assert_eq!(parsed.get("page[size]").map(String::as_str), Some("10"));
    }

    #[test]
    fn query_keeps_empty_values_and_duplicates() {
        let url = compose(
            &base(),
            "articles",
            None,
            NO_RELATIONS,
            [("filter[tag]", "a"), ("filter[tag]", "b"), ("q", "")],
        )
        .expect("compose");
        assert_eq!(
            url.query(),
            Some("filter%5Btag%5D=a&filter%5Btag%5D=b&q=")
        );
    }

    #[test]
    fn id_and_relations_are_single_segments() {
        let url = compose(&base(), "files", Some("a b/c?d"), ["x#y"], NO_QUERY)
            .expect("compose");
        assert_eq!(url.path(), "/files/a%20b%2Fc%3Fd/x%23y");
        assert!(url.query().is_none());
    }

    #[test]
    fn backslash_stays_inside_its_segment() {
        let url = compose(&base(), "files", Some(r"a\b"), [r"x\y"], NO_QUERY).expect("compose");
        assert_eq!(url.path(), "/files/a%5Cb/x%5Cy");
        assert_eq!(url.path_segments().map(Iterator::count), Some(3));
    }

    #[test]
    fn base_path_is_replaced() {
        let base = Url::parse("http://localhost:8080/v1/").expect("valid URL");
        let url = compose(&base, "articles", None, NO_RELATIONS, NO_QUERY).expect("compose");
        assert_eq!(url.as_str(), "http://localhost:8080/articles");
    }
}
