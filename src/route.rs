//! The two routes of the blog: the post list at `/` and a single post at
//! `/post/{id}`. Ids are percent-encoded in paths, since most of them aren't
//! ASCII.

use crate::post::Post;
use crate::store::{Lookup, Store};
use url::Url;

/// Any absolute URL works here; it only gives relative paths something to
/// resolve against.
const BASE: &str = "http://localhost/";

const POST_SEGMENT: &str = "post";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/`
    List,

    /// `/post/{id}`
    Detail(String),
}

impl Route {
    /// Parses a path (optionally with query and fragment, which are ignored).
    /// A single trailing slash is tolerated. Returns `None` for paths that
    /// don't name a route.
    pub fn parse(path: &str) -> Option<Route> {
        let url = Url::parse(BASE).ok()?.join(path).ok()?;
        let mut segments: Vec<&str> = url.path_segments()?.collect();
        if segments.len() > 1 && segments.last() == Some(&"") {
            segments.pop();
        }
        match segments.as_slice() {
            [""] => Some(Route::List),
            [POST_SEGMENT, id] if !id.is_empty() => {
                let id = urlencoding::decode(id).ok()?;
                Some(Route::Detail(id.into_owned()))
            }
            _ => None,
        }
    }

    /// Returns the canonical path for the route.
    pub fn path(&self) -> String {
        match self {
            Route::List => String::from("/"),
            Route::Detail(id) => format!("/{}/{}", POST_SEGMENT, urlencoding::encode(id)),
        }
    }

    pub fn for_post(post: &Post) -> Route {
        Route::Detail(post.id.clone())
    }
}

/// What a route resolves to against a [`Store`].
#[derive(Debug, PartialEq)]
pub enum Page<'a> {
    List(&'a [Post]),
    Detail(&'a Post),

    /// The detail route named a post the store doesn't have.
    NotFound(String),
}

pub fn resolve<'a>(store: &'a Store, route: &Route) -> Page<'a> {
    match route {
        Route::List => Page::List(store.list()),
        Route::Detail(id) => match store.find_by_id(id) {
            Lookup::Found(post) => Page::Detail(post),
            Lookup::NotFound => Page::NotFound(id.clone()),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(Some(Route::List), Route::parse("/"));
        assert_eq!(Some(Route::List), Route::parse(""));
        assert_eq!(Some(Route::List), Route::parse("/?page=2"));
    }

    #[test]
    fn test_parse_detail() {
        let wanted = Some(Route::Detail("hello-world-1".to_owned()));
        assert_eq!(wanted, Route::parse("/post/hello-world-1"));
        assert_eq!(wanted, Route::parse("/post/hello-world-1/"));
        assert_eq!(wanted, Route::parse("/post/hello-world-1?ref=home#top"));
    }

    #[test]
    fn test_parse_encoded_detail() {
        let wanted = Some(Route::Detail("سلام-1".to_owned()));
        assert_eq!(wanted, Route::parse("/post/%D8%B3%D9%84%D8%A7%D9%85-1"));
        assert_eq!(wanted, Route::parse("/post/سلام-1"));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(None, Route::parse("/post"));
        assert_eq!(None, Route::parse("/post/"));
        assert_eq!(None, Route::parse("/post/a/b"));
        assert_eq!(None, Route::parse("/posts/a"));
        assert_eq!(None, Route::parse("/about"));
    }

    #[test]
    fn test_path_round_trip() {
        let routes = vec![
            Route::List,
            Route::Detail("hello-world-1".to_owned()),
            Route::Detail("سلام-دنیا-1714558830123".to_owned()),
        ];
        for route in routes {
            assert_eq!(Some(route.clone()), Route::parse(&route.path()));
        }
        assert_eq!("/post/%D8%B3%D9%84%D8%A7%D9%85-1", Route::Detail("سلام-1".to_owned()).path());
    }

    #[test]
    fn test_resolve() -> crate::store::Result<()> {
        let store = Store::builtin()?;
        let first = &store.list()[0];
        assert_eq!(Page::List(store.list()), resolve(&store, &Route::List));
        assert_eq!(Page::Detail(first), resolve(&store, &Route::for_post(first)));
        assert_eq!(
            Page::NotFound("nope".to_owned()),
            resolve(&store, &Route::Detail("nope".to_owned()))
        );
        Ok(())
    }
}
