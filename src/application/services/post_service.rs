//! Post Service
//!
//! Posts, comments, likes, thread loading and post moderation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    CommentNode, CommentTree, Creator, DeleteOutcome, Member, MemberRepository, MissingCreator, Post,
    PostRepository,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Post service trait
#[async_trait]
pub trait PostService: Send + Sync {
    /// Create a top-level post authored by `input.creator`
    async fn create_post(&self, input: NewPostDto) -> Result<Post, PostError>;

    /// Create a comment under an existing post
    async fn create_comment(&self, input: NewPostDto, parent_id: i64) -> Result<Post, PostError>;

    /// Get a post with its full creator
    async fn get_post_by_id(&self, id: i64) -> Result<Post, PostError>;

    /// All posts of a member, most liked first, with the redacted creator view
    async fn get_top_posts(&self, member: &Member) -> Result<Vec<Post>, PostError>;

    /// Most liked top-level posts that are not deleted
    async fn get_all_posts(&self, limit: i64) -> Result<Vec<Post>, PostError>;

    /// Like a post. Returns `false` when the member had already liked it.
    async fn like_post(&self, post_id: i64, member_id: i64) -> Result<bool, PostError>;

    /// Overwrite title and body. The id is parsed from its textual form.
    async fn edit_post(&self, title: &str, body: &str, id: &str) -> Result<Post, PostError>;

    /// Direct replies in insertion order
    async fn get_children(&self, parent_id: i64) -> Result<Vec<Post>, PostError>;

    /// The whole reply tree below a post
    async fn get_all_comments(&self, post_id: i64) -> Result<CommentNode, PostError>;

    /// Logical delete restricted to the author
    async fn delete_post(&self, post_id: i64, member_id: i64) -> Result<DeleteOutcome, PostError>;

    /// Logical delete by a moderator
    async fn mod_delete_post(&self, post_id: i64) -> Result<Post, PostError>;

    /// Mark a post for moderator review
    async fn flag_post(&self, id: i64) -> Result<(), PostError>;

    /// All posts marked for review
    async fn get_flagged(&self) -> Result<Vec<Post>, PostError>;
}

/// Post or comment creation input
#[derive(Debug, Clone, Default)]
pub struct NewPostDto {
    pub title: Option<String>,
    pub body: String,
    pub creator: Option<Creator>,
}

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Creator {0} not found")]
    CreatorNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for PostError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::NotFound(_) => PostError::NotFound,
            AppError::BadRequest(msg) | AppError::Validation(msg) => PostError::InvalidInput(msg),
            e => PostError::Internal(e.to_string()),
        }
    }
}

impl From<MissingCreator> for PostError {
    fn from(e: MissingCreator) -> Self {
        PostError::CreatorNotFound(e.0)
    }
}

/// PostService implementation
pub struct PostServiceImpl<P, M>
where
    P: PostRepository,
    M: MemberRepository,
{
    post_repo: Arc<P>,
    member_repo: Arc<M>,
    max_comment_depth: usize,
}

impl<P, M> PostServiceImpl<P, M>
where
    P: PostRepository,
    M: MemberRepository,
{
    pub fn new(post_repo: Arc<P>, member_repo: Arc<M>, max_comment_depth: usize) -> Self {
        Self {
            post_repo,
            member_repo,
            max_comment_depth,
        }
    }

    async fn find_post(&self, id: i64) -> Result<Post, PostError> {
        self.post_repo.find_by_id(id).await?.ok_or(PostError::NotFound)
    }

    /// Load every distinct author in one query, keyed by id.
    async fn load_members(&self, mut ids: Vec<i64>) -> Result<HashMap<i64, Member>, PostError> {
        ids.sort_unstable();
        ids.dedup();
        let members = self.member_repo.find_by_ids(&ids).await?;
        Ok(members.into_iter().map(|m| (m.id, m)).collect())
    }

    /// Attach the full creator to each post.
    async fn with_creators(&self, posts: Vec<Post>) -> Result<Vec<Post>, PostError> {
        let members = self
            .load_members(posts.iter().map(|p| p.member_id).collect())
            .await?;

        posts
            .into_iter()
            .map(|post| {
                let member = members
                    .get(&post.member_id)
                    .cloned()
                    .ok_or(PostError::CreatorNotFound(post.member_id))?;
                Ok(post.with_creator(Creator::Member(member)))
            })
            .collect()
    }
}

fn require_creator(input: &NewPostDto) -> Result<&Creator, PostError> {
    input
        .creator
        .as_ref()
        .ok_or_else(|| PostError::InvalidInput("post has no creator".into()))
}

#[async_trait]
impl<P, M> PostService for PostServiceImpl<P, M>
where
    P: PostRepository + 'static,
    M: MemberRepository + 'static,
{
    #[tracing::instrument(skip(self, input))]
    async fn create_post(&self, input: NewPostDto) -> Result<Post, PostError> {
        let creator = require_creator(&input)?;
        let title = input
            .title
            .as_deref()
            .ok_or_else(|| PostError::InvalidInput("post has no title".into()))?;

        let post = self
            .post_repo
            .create_post(title, &input.body, creator.id())
            .await?;

        metrics::record_post_created(false);
        tracing::info!(post_id = post.post_id, member_id = creator.id(), "Post created");
        Ok(post.with_creator(creator.clone()))
    }

    #[tracing::instrument(skip(self, input))]
    async fn create_comment(&self, input: NewPostDto, parent_id: i64) -> Result<Post, PostError> {
        let creator = require_creator(&input)?;

        // A missing parent is reported before attempting the insert
        self.find_post(parent_id).await?;

        let comment = self
            .post_repo
            .create_comment(&input.body, creator.id(), parent_id)
            .await?;

        metrics::record_post_created(true);
        tracing::info!(post_id = comment.post_id, member_id = creator.id(), "Comment created");
        Ok(comment.with_creator(creator.clone()))
    }

    async fn get_post_by_id(&self, id: i64) -> Result<Post, PostError> {
        let post = self.find_post(id).await?;
        let creator = self
            .member_repo
            .find_by_id(post.member_id)
            .await?
            .ok_or(PostError::CreatorNotFound(post.member_id))?;

        Ok(post.with_creator(Creator::Member(creator)))
    }

    async fn get_top_posts(&self, member: &Member) -> Result<Vec<Post>, PostError> {
        let summary = member.summary();
        let posts = self.post_repo.find_by_member(member.id).await?;

        Ok(posts
            .into_iter()
            .map(|p| p.with_creator(Creator::Summary(summary.clone())))
            .collect())
    }

    async fn get_all_posts(&self, limit: i64) -> Result<Vec<Post>, PostError> {
        if limit < 0 {
            return Err(PostError::InvalidInput("limit must not be negative".into()));
        }
        let posts = self.post_repo.find_top_level(limit).await?;
        self.with_creators(posts).await
    }

    #[tracing::instrument(skip(self))]
    async fn like_post(&self, post_id: i64, member_id: i64) -> Result<bool, PostError> {
        let recorded = self.post_repo.like(post_id, member_id).await?;
        if recorded {
            metrics::record_like();
        } else {
            tracing::debug!("Repeat like ignored");
        }
        Ok(recorded)
    }

    #[tracing::instrument(skip(self, title, body))]
    async fn edit_post(&self, title: &str, body: &str, id: &str) -> Result<Post, PostError> {
        let id: i64 = id
            .trim()
            .parse()
            .map_err(|_| PostError::InvalidInput(format!("'{}' is not a post id", id)))?;

        Ok(self.post_repo.update_content(id, title, body).await?)
    }

    async fn get_children(&self, parent_id: i64) -> Result<Vec<Post>, PostError> {
        let children = self.post_repo.find_children(parent_id).await?;
        self.with_creators(children).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_all_comments(&self, post_id: i64) -> Result<CommentNode, PostError> {
        let root = self.find_post(post_id).await?;
        let mut tree = CommentTree::new(root.post_id, self.max_comment_depth);

        let mut pending = vec![(root.post_id, 0usize)];
        while let Some((parent_id, depth)) = pending.pop() {
            let children = self.post_repo.find_children(parent_id).await?;
            pending.extend(tree.insert_children(parent_id, depth, children));
        }

        if !tree.skipped().is_empty() {
            tracing::warn!(skipped = ?tree.skipped(), "Thread contains posts reachable more than once");
        }

        let mut ids = tree.member_ids();
        ids.push(root.member_id);
        let members = self.load_members(ids).await?;

        let node = tree.assemble(root, &members)?;
        tracing::debug!(descendants = node.descendant_count(), "Thread loaded");
        Ok(node)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_post(&self, post_id: i64, member_id: i64) -> Result<DeleteOutcome, PostError> {
        let mut post = self.find_post(post_id).await?;

        let changed = self
            .post_repo
            .soft_delete_owned(post_id, member_id, post.is_comment)
            .await?;

        if changed == 0 {
            tracing::warn!(owner_id = post.member_id, "Delete refused for non-owner");
            return Ok(DeleteOutcome::NotOwner);
        }

        post.mark_deleted();
        tracing::info!("Post deleted by owner");
        Ok(DeleteOutcome::Deleted(post))
    }

    #[tracing::instrument(skip(self))]
    async fn mod_delete_post(&self, post_id: i64) -> Result<Post, PostError> {
        let mut post = self.find_post(post_id).await?;

        self.post_repo.soft_delete(post_id, post.is_comment).await?;

        post.mark_deleted();
        if !post.is_comment {
            post.is_flagged = false;
        }
        metrics::record_moderation("mod_delete");
        tracing::info!("Post deleted by moderator");
        Ok(post)
    }

    #[tracing::instrument(skip(self))]
    async fn flag_post(&self, id: i64) -> Result<(), PostError> {
        self.post_repo.flag(id).await?;
        metrics::record_moderation("flag_post");
        Ok(())
    }

    async fn get_flagged(&self) -> Result<Vec<Post>, PostError> {
        let posts = self.post_repo.find_flagged().await?;
        self.with_creators(posts).await
    }
}
