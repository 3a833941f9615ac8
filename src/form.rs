//! The create-post flow. A [`PostForm`] holds the fields as typed; a
//! [`Composer`] validates it, builds the [`Post`], and keeps the generated
//! snippet around for copying.
//!
//! Submitting never adds the post to the [`crate::store::Store`]. The snippet
//! has to be pasted into the seed file by hand.

use crate::post::{Builder, Clock, Post};
use crate::snippet;
use std::fmt;
use url::Url;

/// The fields of a [`PostForm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Title,
    Excerpt,
    Content,
    ImageUrl,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Excerpt => "excerpt",
            Field::Content => "content",
            Field::ImageUrl => "image URL",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a field was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Problem {
    /// The field is required but blank.
    Missing(Field),

    /// The image URL isn't an absolute `http` or `https` URL.
    InvalidUrl(String),
}

impl Problem {
    pub fn field(&self) -> Field {
        match self {
            Problem::Missing(field) => *field,
            Problem::InvalidUrl(_) => Field::ImageUrl,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Problem::Missing(field) => write!(f, "{} is required", field),
            Problem::InvalidUrl(url) => write!(f, "`{}` is not an http(s) URL", url),
        }
    }
}

/// Returned when a form is submitted with invalid fields. Lists every
/// problem, not only the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub problems: Vec<Problem>,
}

impl ValidationError {
    pub fn fields(&self) -> Vec<Field> {
        self.problems.iter().map(Problem::field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            problem.fmt(f)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The create-post form, as typed by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub excerpt: String,
    pub content: String,

    /// Optional; blank means "use the placeholder image".
    pub image_url: String,
}

impl PostForm {
    /// Checks that title, excerpt, and content aren't blank and that the image
    /// URL, if given, is an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        for (field, value) in &[
            (Field::Title, &self.title),
            (Field::Excerpt, &self.excerpt),
            (Field::Content, &self.content),
        ] {
            if value.trim().is_empty() {
                problems.push(Problem::Missing(*field));
            }
        }

        let image_url = self.image_url.trim();
        if !image_url.is_empty() {
            match Url::parse(image_url) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                _ => problems.push(Problem::InvalidUrl(image_url.to_owned())),
            }
        }

        match problems.is_empty() {
            true => Ok(()),
            false => Err(ValidationError { problems }),
        }
    }

    /// Validates the form and builds a [`Post`] from it.
    pub fn build<C: Clock>(&self, builder: &Builder<C>) -> Result<Post, ValidationError> {
        self.validate()?;
        Ok(builder.build(&self.title, &self.excerpt, &self.content, Some(self.image_url.as_str())))
    }
}

/// Where a [`Composer`] is in the create flow.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    /// The form is open for input.
    Editing,

    /// A snippet was generated. `copied` tracks whether it has been copied
    /// to the clipboard since.
    Generated { post: Post, snippet: String, copied: bool },
}

/// Drives the create-post flow: editing, then a generated snippet, then
/// optionally back to editing for another post.
#[derive(Debug)]
pub struct Composer<C> {
    builder: Builder<C>,
    pub form: PostForm,
    state: State,
}

impl<C: Clock> Composer<C> {
    pub fn new(builder: Builder<C>) -> Composer<C> {
        Composer {
            builder,
            form: PostForm::default(),
            state: State::Editing,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the generated snippet, if there is one.
    pub fn snippet(&self) -> Option<&str> {
        match &self.state {
            State::Generated { snippet, .. } => Some(snippet),
            State::Editing => None,
        }
    }

    /// Validates the form and generates a snippet. On a validation error the
    /// composer stays in [`State::Editing`] with the form untouched.
    pub fn submit(&mut self) -> Result<&str, Error> {
        let post = self.form.build(&self.builder)?;
        let snippet = snippet::serialize(&post)?;
        tracing::info!("generated snippet for post `{}`", post.id);
        self.state = State::Generated {
            post,
            snippet,
            copied: false,
        };
        // Just assigned above.
        Ok(self.snippet().unwrap_or_default())
    }

    /// Records whether the snippet is currently shown as copied. Does nothing
    /// while editing.
    pub fn set_copied(&mut self, value: bool) {
        if let State::Generated { copied, .. } = &mut self.state {
            *copied = value;
        }
    }

    /// Goes back to an empty form to create another post.
    pub fn reset(&mut self) {
        self.form = PostForm::default();
        self.state = State::Editing;
    }
}

/// Represents a failed [`Composer::submit`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the form has invalid fields.
    Validation(ValidationError),

    /// Returned when the post can't be serialized.
    Snippet(snippet::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Validation(err) => err.fmt(f),
            Error::Snippet(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Validation(err) => Some(err),
            Error::Snippet(err) => Some(err),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Error {
        Error::Validation(err)
    }
}

impl From<snippet::Error> for Error {
    fn from(err: snippet::Error) -> Error {
        Error::Snippet(err)
    }
}
