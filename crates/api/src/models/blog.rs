//! Blog post domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use veriquick_core::BlogPostId;

/// A blog post.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    /// Database ID.
    pub id: BlogPostId,
    /// URL slug, unique.
    pub slug: String,
    /// Post title.
    pub title: String,
    /// Short summary for listings.
    pub excerpt: String,
    /// Full markdown body.
    pub body: String,
    /// Author display name.
    pub author: String,
    /// Topic tags.
    pub tags: Vec<String>,
    /// Only published posts are publicly visible.
    pub published: bool,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}
