//! Domain models

pub mod post;

pub use post::{derive_public_url, NewPost, Post};
