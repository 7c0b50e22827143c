use serde_json::json;
use tracing::info;

use super::Gallery;
use crate::error::MutationError;
use crate::model::{Comment, Id};
use crate::state::End;
use crate::validation;

const EMPTY_COMMENT: &str = "Comment cannot be empty.";

impl Gallery {
    /// Comment on `post`. The comment goes to the head of the post's
    /// comment list and every copy of the post counts one more comment.
    pub async fn create_comment(&self, post: Id, content: &str) -> Result<Comment, MutationError> {
        self.signed_in()?;
        validation::require("content", content, EMPTY_COMMENT).map_err(MutationError::Invalid)?;

        let comment: Comment = self
            .http
            .post_json(
                &self.endpoints().comments,
                &json!({ "post": post, "content": content.trim() }),
            )
            .await?;
        self.comments(post).append(comment.clone(), End::Head);
        self.patch_post(post, |p| p.comments_count += 1);
        info!(post, comment = comment.id, "comment created");
        Ok(comment)
    }

    /// Replace a comment's text in place. Counts are untouched.
    pub async fn edit_comment(
        &self,
        id: Id,
        post: Id,
        content: &str,
    ) -> Result<Comment, MutationError> {
        self.signed_in()?;
        validation::require("content", content, EMPTY_COMMENT).map_err(MutationError::Invalid)?;

        let endpoints = self.endpoints();
        let comment: Comment = self
            .http
            .put_json(
                &endpoints.item(&endpoints.comments, id),
                &json!({ "post": post, "content": content.trim() }),
            )
            .await?;
        let updated = comment.clone();
        self.comments(post).patch(id, |c| *c = updated);
        info!(post, comment = id, "comment edited");
        Ok(comment)
    }

    pub async fn delete_comment(&self, id: Id, post: Id) -> Result<(), MutationError> {
        self.signed_in()?;
        let endpoints = self.endpoints();
        self.http
            .delete(&endpoints.item(&endpoints.comments, id))
            .await?;
        self.comments(post).remove(id);
        self.patch_post(post, |p| p.comments_count = p.comments_count.saturating_sub(1));
        info!(post, comment = id, "comment deleted");
        Ok(())
    }
}
