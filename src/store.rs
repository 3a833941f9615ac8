//! The in-memory post store. A [`Store`] is built once from a seed collection
//! and then only read: creating a post produces a snippet for the seed file
//! (see [`crate::form`]) and never adds to the live store.
//!
//! A seed collection is a bracketed, comma-separated list of snippets exactly
//! as [`crate::snippet::serialize`] prints them, so a new post is added by
//! pasting its snippet in:
//!
//! ```text
//! // Newest last.
//! [
//! {
//!   id: 'hello-world-1714558830123',
//!   title: 'Hello World',
//!   excerpt: 'A short summary',
//!   content: 'First line.\nSecond line.',
//!   imageUrl: 'https://picsum.photos/seed/hello-world-1714558830123/400/300',
//!   date: '2024-05-01T10:20:30.123Z'
//! },
//! ]
//! ```

use crate::post::Post;
use crate::snippet;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// The seed collection compiled into the binary.
pub const BUILTIN_SEED: &str = include_str!("../seed/posts.txt");

/// The outcome of [`Store::find_by_id`]. A missing post is an ordinary
/// outcome, not an error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Post),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn post(self) -> Option<&'a Post> {
        match self {
            Lookup::Found(post) => Some(post),
            Lookup::NotFound => None,
        }
    }
}

/// Holds the session's posts in seed order.
#[derive(Debug)]
pub struct Store {
    posts: Vec<Post>,
}

impl Store {
    /// Constructs a store from `posts`, rejecting duplicate ids.
    pub fn new(posts: Vec<Post>) -> Result<Store> {
        let mut seen = HashSet::with_capacity(posts.len());
        for post in &posts {
            if !seen.insert(post.id.as_str()) {
                return Err(Error::DuplicateId(post.id.clone()));
            }
        }
        tracing::debug!("seeded store with {} posts", posts.len());
        Ok(Store { posts })
    }

    /// Constructs a store from the seed compiled into the binary.
    pub fn builtin() -> Result<Store> {
        Store::parse(BUILTIN_SEED).map_err(|e| Error::Annotated("loading built-in seed".to_owned(), Box::new(e)))
    }

    /// Constructs a store from a seed collection.
    pub fn parse(input: &str) -> Result<Store> {
        Store::new(snippet::parse_collection(input)?)
    }

    /// Constructs a store from a seed file.
    pub fn from_file(path: &Path) -> Result<Store> {
        let load = || -> Result<Store> { Store::parse(&crate::util::read_text(path, "seed")?) };
        load().map_err(|e| Error::Annotated(format!("loading seed `{}`", path.display()), Box::new(e)))
    }

    /// Returns every post in seed order.
    pub fn list(&self) -> &[Post] {
        &self.posts
    }

    /// Looks up a post by its exact id. Linear, which is fine for the tens to
    /// hundreds of posts a seed file holds.
    pub fn find_by_id(&self, id: &str) -> Lookup<'_> {
        match self.posts.iter().find(|p| p.id == id) {
            Some(post) => Lookup::Found(post),
            None => Lookup::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Represents the result of loading a [`Store`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a seed collection.
#[derive(Debug)]
pub enum Error {
    /// Returned when two seeded posts share an id.
    DuplicateId(String),

    /// Returned when the seed isn't a valid collection of snippets.
    Snippet(snippet::Error),

    /// Returned when the seed file can't be opened.
    Io(anyhow::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DuplicateId(id) => write!(f, "duplicate post id `{}`", id),
            Error::Snippet(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DuplicateId(_) => None,
            Error::Snippet(err) => Some(err),
            Error::Io(err) => Some(err.as_ref()),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<snippet::Error> for Error {
    /// Converts a [`snippet::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator when parsing the seed.
    fn from(err: snippet::Error) -> Error {
        Error::Snippet(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::Io(err)
    }
}
