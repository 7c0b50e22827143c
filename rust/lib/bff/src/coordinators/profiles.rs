use artshare_client::FormPart;
use tracing::{debug, info};

use super::{Gallery, POSTS, PROFILES, begin_detail, settle_detail};
use crate::collection::patch_all;
use crate::error::MutationError;
use crate::model::{Id, Post, Profile, ProfileDraft};
use crate::state::{Paginated, ProfileDetail};

impl Gallery {
    /// Fetch one profile into `profile/{id}` and refresh any listed copy.
    pub async fn load_profile(&self, id: Id) -> Result<Profile, MutationError> {
        let path = ProfileDetail::path(id);
        begin_detail::<Profile>(&self.store, &path);

        let endpoints = self.endpoints();
        let result = self
            .http
            .get_json::<Profile>(&endpoints.item(&endpoints.profiles, id))
            .await;
        settle_detail(&self.store, &path, &result);
        let profile = result?;

        let fresh = profile.clone();
        let copies = patch_all::<Profile>(&self.store, PROFILES, id, |p| *p = fresh.clone());
        debug!(profile = id, copies, "profile loaded");
        Ok(profile)
    }

    /// Save profile changes. Editing your own image also updates the
    /// session avatar and the avatar shown on your posts.
    pub async fn edit_profile(&self, id: Id, draft: &ProfileDraft) -> Result<Profile, MutationError> {
        let me = self.signed_in()?;

        let mut parts = vec![
            FormPart::text("name", draft.name.trim()),
            FormPart::text("content", draft.content.trim()),
        ];
        if let Some(image) = &draft.image {
            parts.push(FormPart::file(
                "image",
                image.filename.clone(),
                image.mime.clone(),
                image.bytes.clone(),
            ));
        }

        let endpoints = self.endpoints();
        let profile: Profile = self
            .http
            .put_multipart(&endpoints.item(&endpoints.profiles, id), parts)
            .await?;
        let updated = profile.clone();
        self.patch_profile(id, |p| *p = updated.clone());

        if id == me.profile_id {
            self.session.set_avatar(profile.image.clone());
            let avatar = profile.image.clone();
            self.store.update_all::<Paginated<Post>, _>(POSTS, |_, current| {
                if !current.items.iter().any(|p| p.profile_id == Some(id)) {
                    return None;
                }
                let mut next = current.clone();
                for post in next.items.iter_mut().filter(|p| p.profile_id == Some(id)) {
                    post.profile_image = avatar.clone();
                }
                Some(next)
            });
        }
        info!(profile = id, "profile edited");
        Ok(profile)
    }
}
