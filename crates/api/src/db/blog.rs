//! Blog post database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use veriquick_core::BlogPostId;

use super::RepositoryError;
use crate::models::blog::BlogPost;

/// Row type for the `blog_posts` table.
#[derive(sqlx::FromRow)]
struct BlogPostRow {
    id: i32,
    slug: String,
    title: String,
    excerpt: String,
    body: String,
    author: String,
    tags: Vec<String>,
    published: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const BLOG_COLUMNS: &str =
    "id, slug, title, excerpt, body, author, tags, published, published_at, created_at, updated_at";

impl BlogPostRow {
    fn into_post(self) -> BlogPost {
        BlogPost {
            id: BlogPostId::new(self.id),
            slug: self.slug,
            title: self.title,
            excerpt: self.excerpt,
            body: self.body,
            author: self.author,
            tags: self.tags,
            published: self.published,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fields for creating or updating a blog post.
pub struct UpsertBlogPost<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub excerpt: &'a str,
    pub body: &'a str,
    pub author: &'a str,
    pub tags: &'a [String],
    pub published: bool,
}

/// Repository for blog post database operations.
pub struct BlogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogRepository<'a> {
    /// Create a new blog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows: Vec<BlogPostRow> = sqlx::query_as(&format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts
             WHERE published = TRUE
             ORDER BY published_at DESC NULLS LAST
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogPostRow::into_post).collect())
    }

    /// List all posts including drafts (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows: Vec<BlogPostRow> = sqlx::query_as(&format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogPostRow::into_post).collect())
    }

    /// Get a post by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, RepositoryError> {
        let row: Option<BlogPostRow> = sqlx::query_as(&format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(BlogPostRow::into_post))
    }

    /// Create a post. `published_at` is stamped when created published.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, post: UpsertBlogPost<'_>) -> Result<BlogPost, RepositoryError> {
        let row: BlogPostRow = sqlx::query_as(&format!(
            "INSERT INTO blog_posts (slug, title, excerpt, body, author, tags, published, \
             published_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN NOW() END)
             RETURNING {BLOG_COLUMNS}"
        ))
        .bind(post.slug)
        .bind(post.title)
        .bind(post.excerpt)
        .bind(post.body)
        .bind(post.author)
        .bind(post.tags)
        .bind(post.published)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "slug already exists"))?;

        Ok(row.into_post())
    }

    /// Update a post by slug. Publishing for the first time stamps
    /// `published_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slug doesn't exist.
    pub async fn update(
        &self,
        slug: &str,
        post: UpsertBlogPost<'_>,
    ) -> Result<BlogPost, RepositoryError> {
        let row: Option<BlogPostRow> = sqlx::query_as(&format!(
            "UPDATE blog_posts SET
                 slug = $2,
                 title = $3,
                 excerpt = $4,
                 body = $5,
                 author = $6,
                 tags = $7,
                 published = $8,
                 published_at = CASE
                     WHEN $8 AND published_at IS NULL THEN NOW()
                     ELSE published_at
                 END,
                 updated_at = NOW()
             WHERE slug = $1
             RETURNING {BLOG_COLUMNS}"
        ))
        .bind(slug)
        .bind(post.slug)
        .bind(post.title)
        .bind(post.excerpt)
        .bind(post.body)
        .bind(post.author)
        .bind(post.tags)
        .bind(post.published)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "slug already exists"))?;

        row.map(BlogPostRow::into_post).ok_or(RepositoryError::NotFound)
    }

    /// Delete a post by slug.
    ///
    /// Returns `true` if the post was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, slug: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE slug = $1")
            .bind(slug)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
