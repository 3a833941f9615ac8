//! Plain-text rendering of [`Page`]s for the terminal.

use crate::post::Post;
use crate::route::{Page, Route};
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

pub fn render(page: &Page) -> String {
    match page {
        Page::List(posts) => list(posts),
        Page::Detail(post) => detail(post),
        Page::NotFound(id) => not_found(id),
    }
}

/// One block per post: title, date, excerpt, and the post's path.
pub fn list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return String::from("No posts yet.\n");
    }
    let mut out = String::new();
    for (i, post) in posts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", post.title);
        let _ = writeln!(out, "  {}", format_date(&post.date));
        let _ = writeln!(out, "  {}", post.excerpt);
        let _ = writeln!(out, "  {}", Route::for_post(post).path());
    }
    out
}

/// The whole post. The content is printed as-is so its line breaks survive.
pub fn detail(post: &Post) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", post.title);
    let _ = writeln!(out, "Published {}", format_date(&post.date));
    let _ = writeln!(out, "Image: {}", post.image_url);
    out.push('\n');
    out.push_str(&post.content);
    if !post.content.ends_with('\n') {
        out.push('\n');
    }
    let _ = writeln!(out, "\nBack to all posts: {}", Route::List.path());
    out
}

pub fn not_found(id: &str) -> String {
    format!(
        "Post not found!\nThere is no post with the id `{}`.\nBack to the home page: {}\n",
        id,
        Route::List.path()
    )
}

/// The generated snippet with instructions for adding it to the seed file.
pub fn snippet_instructions(snippet: &str, seed: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Post data generated!\n");
    let _ = writeln!(out, "To publish it:");
    let _ = writeln!(out, "  1. Copy the snippet below.");
    let _ = writeln!(out, "  2. Open {}.", seed);
    let _ = writeln!(out, "  3. Add it as a new entry of the post collection.");
    let _ = writeln!(out, "  4. Save, commit, and redeploy the site.\n");
    out.push_str(snippet);
    out.push('\n');
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::{Builder, FixedClock};
    use chrono::TimeZone;

    fn fixture(content: &str) -> Post {
        Builder::with_clock(FixedClock(Utc.ymd(2024, 5, 1).and_hms_milli(10, 20, 30, 123)))
            .build("سلام دنیا", "خلاصه", content, Some("https://example.com/a.jpg"))
    }

    #[test]
    fn test_list() {
        let post = fixture("c");
        let wanted = "سلام دنیا\n  2024-05-01 10:20\n  خلاصه\n  /post/\
            %D8%B3%D9%84%D8%A7%D9%85-%D8%AF%D9%86%DB%8C%D8%A7-1714558830123\n";
        assert_eq!(wanted, list(&[post]));
        assert_eq!("No posts yet.\n", list(&[]));
    }

    #[test]
    fn test_detail_preserves_line_breaks() {
        let rendered = detail(&fixture("line one\nline two"));
        assert!(rendered.contains("\n\nline one\nline two\n\nBack to all posts: /\n"));
        assert!(rendered.starts_with("سلام دنیا\nPublished 2024-05-01 10:20\nImage: https://example.com/a.jpg\n"));
    }

    #[test]
    fn test_render_not_found() {
        let rendered = render(&Page::NotFound("missing".to_owned()));
        assert!(rendered.starts_with("Post not found!\n"));
        assert!(rendered.contains("`missing`"));
    }
}
