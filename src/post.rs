//! Defines the [`Post`] type and the [`Builder`] which assembles new posts from
//! user-supplied fields. A post's `id` is its slugified title followed by the
//! creation instant in epoch milliseconds, e.g. `hello-world-1714558830123`.
//!
//! Two posts built from the same title within the same millisecond get the
//! same `id`. This is a known weakness and is left alone on purpose.

use crate::slug::Slugger;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// The title used for the slug when the real title is blank or slugifies to
/// nothing.
pub const DEFAULT_FALLBACK_TITLE: &str = "untitled";

/// The image used when a post is created without one. `{id}` is replaced with
/// the post's `id`.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://picsum.photos/seed/{id}/400/300";

/// A blog post. Field order is canonical: it's the order used by the seed file
/// and by [`crate::snippet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub excerpt: String,

    /// The body. May contain simple markup; newlines are line breaks.
    pub content: String,
    pub image_url: String,

    /// The creation instant, written as ISO-8601 UTC with milliseconds.
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
}

/// Serializes dates as `2024-05-01T10:20:30.123Z`. Parsing accepts any
/// RFC 3339 timestamp.
pub mod iso_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(|e| D::Error::custom(format!("invalid date `{}`: {}", s, e)))
    }
}

/// A source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Returns its start instant, then advances by `step_millis` on every call.
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<DateTime<Utc>>,
    step: chrono::Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step_millis: i64) -> SteppingClock {
        SteppingClock {
            next: Cell::new(start),
            step: chrono::Duration::milliseconds(step_millis),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

/// Assembles [`Post`]s. Doesn't validate its inputs; that's the job of
/// [`crate::form::PostForm::validate`].
#[derive(Clone, Debug)]
pub struct Builder<C> {
    pub slugger: Slugger,

    /// See [`DEFAULT_FALLBACK_TITLE`].
    pub fallback_title: String,

    /// See [`DEFAULT_PLACEHOLDER_IMAGE`].
    pub placeholder_image: String,

    pub clock: C,
}

impl Default for Builder<SystemClock> {
    fn default() -> Self {
        Builder::with_clock(SystemClock)
    }
}

impl<C: Clock> Builder<C> {
    /// Constructs a builder with the default slugger, fallback title, and
    /// placeholder image.
    pub fn with_clock(clock: C) -> Builder<C> {
        Builder {
            slugger: Slugger::default(),
            fallback_title: DEFAULT_FALLBACK_TITLE.to_owned(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_owned(),
            clock,
        }
    }

    /// Builds a post stamped with the clock's current instant. A blank
    /// `image_url` (or `None`) is replaced by the placeholder image.
    pub fn build(&self, title: &str, excerpt: &str, content: &str, image_url: Option<&str>) -> Post {
        let date = truncate_to_millis(self.clock.now());
        let id = self.id_for(title, &date);
        let image_url = match image_url.map(str::trim) {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => self.placeholder_image_for(&id),
        };
        tracing::debug!("built post `{}`", id);
        Post {
            id,
            title: title.to_owned(),
            excerpt: excerpt.to_owned(),
            content: content.to_owned(),
            image_url,
            date,
        }
    }

    /// Returns `{slug}-{epoch millis}`.
    pub fn id_for(&self, title: &str, at: &DateTime<Utc>) -> String {
        let slug = match title.trim() {
            "" => self.slugger.slugify(&self.fallback_title),
            title => match self.slugger.slugify(title) {
                slug if slug.is_empty() => self.slugger.slugify(&self.fallback_title),
                slug => slug,
            },
        };
        format!("{}-{}", slug, at.timestamp_millis())
    }

    pub fn placeholder_image_for(&self, id: &str) -> String {
        self.placeholder_image.replace("{id}", id)
    }
}

fn truncate_to_millis(date: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = date.nanosecond() / 1_000_000 * 1_000_000;
    date.with_nanosecond(nanos).unwrap_or(date)
}
