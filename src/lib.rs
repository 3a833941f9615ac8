//! The library code for `daftar`, a tiny static blog. Posts live in a seed
//! collection that is edited by hand; the library reads it and helps write to
//! it. It breaks down into three parts:
//!
//! 1. Reading: the seed collection is loaded once into a read-only
//!    [`store::Store`], and [`route`] maps the two paths of the blog (`/` and
//!    `/post/{id}`) onto it.
//! 2. Creating: a [`form::Composer`] validates the create-post form, builds the
//!    [`post::Post`] (its id comes from [`slug`]), and turns it into a snippet
//!    with [`snippet`].
//! 3. Copying: [`clipboard`] puts the snippet on the system clipboard and shows
//!    a short-lived acknowledgment.
//!
//! Creating a post never touches the store. The snippet has to be pasted into
//! the seed file by hand, and the site rebuilt.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod clipboard;
pub mod config;
pub mod form;
pub mod post;
pub mod route;
pub mod slug;
pub mod snippet;
pub mod store;
pub mod util;
pub mod view;
