//! Handler implementations and Flux wiring.
//!
//! `register_handlers` binds every request in [`crate::request`] to the
//! coordinator call behind it. Handlers translate outcomes into view state
//! (form errors, notices, routes) and never fail themselves.

pub mod auth_handlers;
pub mod comment_handlers;
pub mod helpers;
pub mod post_handlers;
pub mod profile_handlers;

use std::sync::Arc;

use artshare_flux::Flux;

use crate::coordinators::Gallery;
use crate::request::*;

/// Register all handlers with a Flux instance.
pub fn register_handlers(flux: &Flux, gallery: Arc<Gallery>) {
    // auth/restore
    {
        let gallery = gallery.clone();
        flux.on::<RestoreReq, _, _>(move |_, _| {
            let gallery = gallery.clone();
            async move {
                auth_handlers::handle_restore(&gallery).await;
            }
        });
    }

    // auth/login
    {
        let gallery = gallery.clone();
        flux.on::<LoginReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                auth_handlers::handle_login(&req, &store, &gallery).await;
            }
        });
    }

    // auth/register
    {
        let gallery = gallery.clone();
        flux.on::<RegisterReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                auth_handlers::handle_register(&req, &store, &gallery).await;
            }
        });
    }

    // auth/logout
    {
        let gallery = gallery.clone();
        flux.on::<LogoutReq, _, _>(move |_, store| {
            let gallery = gallery.clone();
            async move {
                auth_handlers::handle_logout(&store, &gallery).await;
            }
        });
    }

    // auth/change-password
    {
        let gallery = gallery.clone();
        flux.on::<ChangePasswordReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                auth_handlers::handle_change_password(&req, &store, &gallery).await;
            }
        });
    }

    // posts/load
    {
        let gallery = gallery.clone();
        flux.on::<LoadPostsReq, _, _>(move |req, _| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_load(&req, &gallery).await;
            }
        });
    }

    // posts/load-more
    {
        let gallery = gallery.clone();
        flux.on::<LoadMorePostsReq, _, _>(move |req, _| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_load_more(&req, &gallery).await;
            }
        });
    }

    // post/load
    {
        let gallery = gallery.clone();
        flux.on::<LoadPostReq, _, _>(move |req, _| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_load_one(&req, &gallery).await;
            }
        });
    }

    // post/create
    {
        let gallery = gallery.clone();
        flux.on::<CreatePostReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_create(&req, &store, &gallery).await;
            }
        });
    }

    // post/edit
    {
        let gallery = gallery.clone();
        flux.on::<EditPostReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_edit(&req, &store, &gallery).await;
            }
        });
    }

    // post/delete
    {
        let gallery = gallery.clone();
        flux.on::<DeletePostReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_delete(&req, &store, &gallery).await;
            }
        });
    }

    // post/like
    {
        let gallery = gallery.clone();
        flux.on::<ToggleLikeReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_like(&req, &store, &gallery).await;
            }
        });
    }

    // post/bookmark
    {
        let gallery = gallery.clone();
        flux.on::<ToggleBookmarkReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                post_handlers::handle_bookmark(&req, &store, &gallery).await;
            }
        });
    }

    // comments/load
    {
        let gallery = gallery.clone();
        flux.on::<LoadCommentsReq, _, _>(move |req, _| {
            let gallery = gallery.clone();
            async move {
                comment_handlers::handle_load(&req, &gallery).await;
            }
        });
    }

    // comments/load-more
    {
        let gallery = gallery.clone();
        flux.on::<LoadMoreCommentsReq, _, _>(move |req, _| {
            let gallery = gallery.clone();
            async move {
                comment_handlers::handle_load_more(&req, &gallery).await;
            }
        });
    }

    // comment/create
    {
        let gallery = gallery.clone();
        flux.on::<CreateCommentReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                comment_handlers::handle_create(&req, &store, &gallery).await;
            }
        });
    }

    // comment/edit
    {
        let gallery = gallery.clone();
        flux.on::<EditCommentReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                comment_handlers::handle_edit(&req, &store, &gallery).await;
            }
        });
    }

    // comment/delete
    {
        let gallery = gallery.clone();
        flux.on::<DeleteCommentReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                comment_handlers::handle_delete(&req, &store, &gallery).await;
            }
        });
    }

    // profiles/load-top
    {
        let gallery = gallery.clone();
        flux.on::<LoadTopProfilesReq, _, _>(move |_, _| {
            let gallery = gallery.clone();
            async move {
                profile_handlers::handle_load_top(&gallery).await;
            }
        });
    }

    // profiles/load-more
    {
        let gallery = gallery.clone();
        flux.on::<LoadMoreProfilesReq, _, _>(move |_, _| {
            let gallery = gallery.clone();
            async move {
                profile_handlers::handle_load_more(&gallery).await;
            }
        });
    }

    // profile/load
    {
        let gallery = gallery.clone();
        flux.on::<LoadProfileReq, _, _>(move |req, _| {
            let gallery = gallery.clone();
            async move {
                profile_handlers::handle_load(&req, &gallery).await;
            }
        });
    }

    // profile/follow
    {
        let gallery = gallery.clone();
        flux.on::<ToggleFollowReq, _, _>(move |req, store| {
            let gallery = gallery.clone();
            async move {
                profile_handlers::handle_follow(&req, &store, &gallery).await;
            }
        });
    }

    // profile/edit
    flux.on::<EditProfileReq, _, _>(move |req, store| {
        let gallery = gallery.clone();
        async move {
            profile_handlers::handle_edit(&req, &store, &gallery).await;
        }
    });
}
