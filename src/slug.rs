//! Turns free text into identifier-safe slugs. See [`Slugger::slugify`] for
//! the exact algorithm. ASCII letters, ASCII digits, and `-` are always
//! allowed; everything else has to be admitted by a [`CharRange`] in the
//! slugger's [`AllowedChars`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// The Persian/Arabic letter blocks admitted by [`AllowedChars::default`].
pub const PERSIAN_RANGES: [CharRange; 4] = [
    CharRange::new('\u{0600}', '\u{06FF}'),
    CharRange::new('\u{0750}', '\u{077F}'),
    CharRange::new('\u{FB50}', '\u{FDFF}'),
    CharRange::new('\u{FE70}', '\u{FEFF}'),
];

/// An inclusive range of Unicode scalar values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharRange {
    start: char,
    end: char,
}

impl CharRange {
    pub const fn new(start: char, end: char) -> CharRange {
        CharRange { start, end }
    }

    pub fn contains(&self, c: char) -> bool {
        self.start <= c && c <= self.end
    }
}

impl FromStr for CharRange {
    type Err = RangeError;

    /// Parses ranges written as two hex code points joined by a hyphen, e.g.
    /// `0600-06FF`. A single code point (`200C`) is a range of one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn code_point(s: &str, range: &str) -> Result<char, RangeError> {
            let value = u32::from_str_radix(s.trim(), 16)
                .map_err(|_| RangeError::InvalidCodePoint(range.to_owned()))?;
            std::char::from_u32(value).ok_or_else(|| RangeError::InvalidCodePoint(range.to_owned()))
        }

        let (start, end) = match s.find('-') {
            Some(i) => (code_point(&s[..i], s)?, code_point(&s[i + 1..], s)?),
            None => {
                let c = code_point(s, s)?;
                (c, c)
            }
        };
        if start > end {
            return Err(RangeError::Reversed(s.to_owned()));
        }
        Ok(CharRange::new(start, end))
    }
}

impl<'de> Deserialize<'de> for CharRange {
    fn deserialize<D>(deserializer: D) -> Result<CharRange, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse::<CharRange>()
            .map_err(|e| D::Error::custom(format!("{}", e)))
    }
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X}-{:04X}", self.start as u32, self.end as u32)
    }
}

/// The set of characters that survive slugification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowedChars {
    ranges: Vec<CharRange>,
}

impl AllowedChars {
    /// Only ASCII letters, ASCII digits, and `-`.
    pub fn ascii() -> AllowedChars {
        AllowedChars { ranges: Vec::new() }
    }

    pub fn with_ranges<I: IntoIterator<Item = CharRange>>(ranges: I) -> AllowedChars {
        AllowedChars {
            ranges: ranges.into_iter().collect(),
        }
    }

    pub fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }

    /// Whitespace is never allowed, even when a configured range covers it.
    pub fn allows(&self, c: char) -> bool {
        c == '-'
            || c.is_ascii_alphanumeric()
            || (!is_whitespace(c) && self.ranges.iter().any(|r| r.contains(c)))
    }
}

impl Default for AllowedChars {
    fn default() -> Self {
        AllowedChars::with_ranges(PERSIAN_RANGES.iter().copied())
    }
}

/// Matches the `White_Space` property plus the byte-order mark, which browsers
/// also treat as whitespace.
fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Generates slugs against a fixed [`AllowedChars`] set.
#[derive(Clone, Debug, Default)]
pub struct Slugger {
    allowed: AllowedChars,
}

impl Slugger {
    pub fn new(allowed: AllowedChars) -> Slugger {
        Slugger { allowed }
    }

    pub fn allowed(&self) -> &AllowedChars {
        &self.allowed
    }

    /// Slugifies `text`. The steps run in this order:
    ///
    /// 1. lowercase, then trim surrounding whitespace
    /// 2. replace each run of whitespace with a single `-`
    /// 3. drop every character not in the allowed set
    /// 4. collapse runs of `-` into one
    ///
    /// The result may be empty (e.g. for `"!!!"`); callers that need a
    /// non-empty identifier supply their own fallback.
    pub fn slugify(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let trimmed = lowered.trim_matches(is_whitespace);

        let mut hyphenated = String::with_capacity(trimmed.len());
        let mut in_whitespace = false;
        for c in trimmed.chars() {
            if is_whitespace(c) {
                if !in_whitespace {
                    hyphenated.push('-');
                }
                in_whitespace = true;
            } else {
                hyphenated.push(c);
                in_whitespace = false;
            }
        }

        // Filtering and collapsing in one pass is the same as doing steps 3
        // and 4 separately: a run of hyphens only forms after removal.
        let mut slug = String::with_capacity(hyphenated.len());
        for c in hyphenated.chars().filter(|&c| self.allowed.allows(c)) {
            if c == '-' && slug.ends_with('-') {
                continue;
            }
            slug.push(c);
        }
        slug
    }
}

/// Slugifies `text` with the default (ASCII plus Persian) character set.
pub fn slugify(text: &str) -> String {
    Slugger::default().slugify(text)
}

/// Represents a malformed [`CharRange`].
#[derive(Debug, PartialEq)]
pub enum RangeError {
    /// Returned when either end of the range isn't a hex Unicode scalar value.
    InvalidCodePoint(String),

    /// Returned when the start of the range is past its end.
    Reversed(String),
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RangeError::InvalidCodePoint(range) => {
                write!(f, "invalid code point in character range `{}`", range)
            }
            RangeError::Reversed(range) => {
                write!(f, "character range `{}` starts after it ends", range)
            }
        }
    }
}

impl std::error::Error for RangeError {}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "!!!",
        "Hello, World!",
        "  Trailing and leading  ",
        "a -- b",
        "tabs\tand\nnewlines",
        "سلام دنیا",
        "  سلام،   دنیا!  ",
        "می‌خواهم بنویسم",
        "Rust 2018 – edition",
        "\u{FEFF}bom\u{FEFF}word",
        "ΣΊΣΥΦΟΣ",
        "-leading-hyphen-",
        "emoji 🎉 party",
    ];

    #[test]
    fn test_slugify_ascii() {
        assert_eq!("hello-world", slugify("Hello, World!"));
        assert_eq!("trailing-and-leading", slugify("  Trailing and leading  "));
        assert_eq!("tabs-and-newlines", slugify("tabs\tand\nnewlines"));
        assert_eq!("rust-2018-edition", slugify("Rust 2018 – edition"));
        assert_eq!("emoji-party", slugify("emoji 🎉 party"));
    }

    #[test]
    fn test_slugify_collapses_hyphens() {
        assert_eq!("a-b", slugify("a -- b"));
        assert_eq!("a-b", slugify("a - ! - b"));
        assert_eq!("-leading-hyphen-", slugify("-leading-hyphen-"));
    }

    #[test]
    fn test_slugify_persian() {
        assert_eq!("سلام-دنیا", slugify("سلام دنیا"));
        // The Arabic comma (U+060C) sits inside the allowed block.
        assert_eq!("سلام،-دنیا", slugify("  سلام،   دنیا!  "));
        // ZWNJ is outside every allowed range.
        assert_eq!("میخواهم-بنویسم", slugify("می‌خواهم بنویسم"));
    }

    #[test]
    fn test_slugify_byte_order_mark_is_whitespace() {
        assert_eq!("bom-word", slugify("\u{FEFF}bom\u{FEFF}word"));
    }

    #[test]
    fn test_slugify_empty_results() {
        assert_eq!("", slugify(""));
        assert_eq!("", slugify("   "));
        assert_eq!("", slugify("!!!"));
        assert_eq!("", slugify("ΣΊΣΥΦΟΣ"));
    }

    #[test]
    fn test_ascii_only_drops_persian() {
        let slugger = Slugger::new(AllowedChars::ascii());
        assert_eq!("-2", slugger.slugify("سلام 2"));
    }

    #[test]
    fn test_custom_range_admits_greek() -> Result<(), RangeError> {
        let slugger = Slugger::new(AllowedChars::with_ranges(vec!["0370-03FF".parse()?]));
        assert_eq!("σίσυφος", slugger.slugify("ΣΊΣΥΦΟΣ"));
        Ok(())
    }

    #[test]
    fn test_slugify_output_is_allowed_and_idempotent() {
        let slugger = Slugger::default();
        for sample in SAMPLES {
            let slug = slugger.slugify(sample);
            assert!(
                slug.chars().all(|c| !is_whitespace(c) && slugger.allowed().allows(c)),
                "{:?} -> {:?}",
                sample,
                slug
            );
            assert!(!slug.contains("--"), "{:?} -> {:?}", sample, slug);
            assert_eq!(slug, slugger.slugify(&slug), "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_slugify_empty_only_without_allowed_chars() {
        let slugger = Slugger::default();
        for sample in SAMPLES.iter().filter(|s| !s.is_empty()) {
            let any_allowed = sample.chars().any(|c| slugger.allowed().allows(c));
            assert_eq!(any_allowed, !slugger.slugify(sample).is_empty(), "{:?}", sample);
        }
    }

    #[test]
    fn test_parse_char_range() -> Result<(), RangeError> {
        assert_eq!(CharRange::new('\u{0600}', '\u{06FF}'), "0600-06FF".parse()?);
        assert_eq!(CharRange::new('\u{200C}', '\u{200C}'), "200c".parse()?);
        assert_eq!("0600-06FF", CharRange::new('\u{0600}', '\u{06FF}').to_string());
        Ok(())
    }

    #[test]
    fn test_parse_char_range_errors() {
        assert_eq!(
            Err(RangeError::Reversed("06FF-0600".to_owned())),
            "06FF-0600".parse::<CharRange>()
        );
        assert_eq!(
            Err(RangeError::InvalidCodePoint("zz".to_owned())),
            "zz".parse::<CharRange>()
        );
        assert_eq!(
            Err(RangeError::InvalidCodePoint("D800".to_owned())),
            "D800".parse::<CharRange>()
        );
    }
}
