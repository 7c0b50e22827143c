use artshare_client::FormPart;
use tracing::{debug, info};

use super::{Gallery, POSTS, begin_detail, settle_detail};
use crate::collection::{PostListing, PostScope, patch_all, remove_all};
use crate::error::MutationError;
use crate::model::{Id, Post, PostDraft};
use crate::state::{End, PostDetail};
use crate::validation::Validator;

impl Gallery {
    /// Fetch one post into `post/{id}`.
    ///
    /// Copies held by feeds are refreshed in place; the post is never
    /// added to a feed that does not already hold it.
    pub async fn load_post(&self, id: Id) -> Result<Post, MutationError> {
        let path = PostDetail::path(id);
        begin_detail::<Post>(&self.store, &path);

        let endpoints = self.endpoints();
        let result = self
            .http
            .get_json::<Post>(&endpoints.item(&endpoints.posts, id))
            .await;
        settle_detail(&self.store, &path, &result);
        let post = result?;

        let fresh = post.clone();
        let copies = patch_all::<Post>(&self.store, POSTS, id, |p| *p = fresh.clone());
        debug!(post = id, copies, "post loaded");
        Ok(post)
    }

    /// Publish a new post. It is prepended to the global feed and the
    /// owner's feed, and the owner's post count goes up.
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, MutationError> {
        let me = self.signed_in()?;
        Validator::new()
            .require("title", &draft.title, "Please add a title.")
            .require_some("image", draft.image.as_ref(), "Please select an image.")
            .finish()
            .map_err(MutationError::Invalid)?;

        let post: Post = self
            .http
            .post_multipart(&self.endpoints().posts, post_form(draft))
            .await?;

        let owner = post.profile_id.unwrap_or(me.profile_id);
        self.posts(PostListing::feed()).append(post.clone(), End::Head);
        self.posts(PostListing::new(PostScope::OwnedBy(owner)))
            .append(post.clone(), End::Head);
        self.patch_profile(owner, |p| p.posts_count += 1);
        info!(post = post.id, "post created");
        Ok(post)
    }

    /// Save changes to a post. Leaving `draft.image` empty keeps the
    /// current image.
    pub async fn edit_post(&self, id: Id, draft: &PostDraft) -> Result<Post, MutationError> {
        self.signed_in()?;
        Validator::new()
            .require("title", &draft.title, "Please add a title.")
            .finish()
            .map_err(MutationError::Invalid)?;

        let endpoints = self.endpoints();
        let post: Post = self
            .http
            .put_multipart(&endpoints.item(&endpoints.posts, id), post_form(draft))
            .await?;
        let updated = post.clone();
        self.patch_post(id, |p| *p = updated.clone());
        info!(post = id, "post edited");
        Ok(post)
    }

    /// Delete a post and drop it from every feed. Its comments and likes
    /// are gone server-side, so the comment list goes too.
    pub async fn delete_post(&self, id: Id) -> Result<(), MutationError> {
        let me = self.signed_in()?;
        let owner = self
            .find_post(id)
            .and_then(|p| p.profile_id)
            .unwrap_or(me.profile_id);

        let endpoints = self.endpoints();
        self.http
            .delete(&endpoints.item(&endpoints.posts, id))
            .await?;

        let copies = remove_all::<Post>(&self.store, POSTS, id);
        self.store.remove(&PostDetail::path(id));
        self.store.remove(&self.comments(id).path());
        self.patch_profile(owner, |p| p.posts_count = p.posts_count.saturating_sub(1));
        info!(post = id, copies, "post deleted");
        Ok(())
    }
}

fn post_form(draft: &PostDraft) -> Vec<FormPart> {
    let mut parts = vec![
        FormPart::text("title", draft.title.trim()),
        FormPart::text("content", draft.content.trim()),
        FormPart::text("is_private", draft.is_private.to_string()),
    ];
    if let Some(artist) = &draft.artist_name {
        parts.push(FormPart::text("artist_name", artist.trim()));
    }
    if let Some(year) = draft.year_of_artwork {
        parts.push(FormPart::text("year_of_artwork", year.to_string()));
    }
    if let Some(image) = &draft.image {
        parts.push(FormPart::file(
            "image",
            image.filename.clone(),
            image.mime.clone(),
            image.bytes.clone(),
        ));
    }
    parts
}
