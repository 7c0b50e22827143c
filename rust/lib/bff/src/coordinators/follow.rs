use artshare_client::ToggleOutcome;
use serde_json::json;
use tracing::info;

use super::Gallery;
use crate::error::MutationError;
use crate::model::{Id, Profile};

impl Gallery {
    /// Follow `profile`, or unfollow it when already followed.
    ///
    /// The target's follower count and the signed-in user's own following
    /// count move together. Following yourself is refused before any
    /// request is sent.
    pub async fn toggle_follow(&self, profile: Id) -> Result<ToggleOutcome, MutationError> {
        let me = self.signed_in()?;
        if profile == me.profile_id {
            return Err(MutationError::SelfFollow);
        }
        let target = match self.find_profile(profile) {
            Some(target) => target,
            None => self.load_profile(profile).await?,
        };
        if target.is_owner {
            return Err(MutationError::SelfFollow);
        }

        let endpoints = self.endpoints();
        let outcome = match target.following_id {
            Some(following) => {
                self.http
                    .delete(&endpoints.item(&endpoints.followers, following))
                    .await?;
                ToggleOutcome::Removed
            }
            None => {
                self.http
                    .toggle(&endpoints.followers, &json!({ "followed": profile }))
                    .await?
            }
        };

        let following_id = outcome.created_id();
        self.patch_profile(profile, |p| apply_follow(p, following_id));
        let was_following = target.following_id.is_some();
        if was_following != following_id.is_some() {
            let delta = |p: &mut Profile| {
                p.following_count = if was_following {
                    p.following_count.saturating_sub(1)
                } else {
                    p.following_count + 1
                };
            };
            self.patch_profile(me.profile_id, delta);
        }
        info!(profile, following = following_id.is_some(), "follow toggled");
        Ok(outcome)
    }
}

fn apply_follow(profile: &mut Profile, following_id: Option<Id>) {
    match following_id {
        Some(id) => {
            if profile.following_id.replace(id).is_none() {
                profile.followers_count += 1;
            }
        }
        None => {
            if profile.following_id.take().is_some() {
                profile.followers_count = profile.followers_count.saturating_sub(1);
            }
        }
    }
}
