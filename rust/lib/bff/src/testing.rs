//! In-memory backend for the crate's tests.
//!
//! [`FakeServer`] speaks the API's REST dialect: DRF-style pages with
//! absolute `next` URLs, field-keyed 400 bodies, and JWT-style 401s for
//! unknown tokens. It keeps relational rows and derives counts and
//! per-viewer flags (`like_id`, `following_id`, `is_owner`) on every read,
//! so the client only ever sees what a real server would say.
//!
//! Test hooks: page size, one-shot faults, holds that park a request until
//! released, token expiry and a request log.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use artshare_client::{
    ApiError, ApiRequest, ApiResponse, Endpoints, MemoryTokenStorage, PartValue, RequestBody,
    StoredTokens, Transport,
};
use artshare_flux::StateStore;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::Notify;

use crate::coordinators::Gallery;
use crate::model::Id;

pub(crate) const ADA: &str = "ada";
pub(crate) const BO: &str = "bo";
pub(crate) const SEEDED_POSTS: usize = 6;

const ORIGIN: &str = "http://fake.test";
const DEFAULT_PAGE_SIZE: usize = 10;

// ── Rows ────────────────────────────────────────────────────────────

struct User {
    id: Id,
    username: String,
    password: String,
}

struct ProfileRow {
    id: Id,
    user: Id,
    name: String,
    content: String,
    image: Option<String>,
}

struct PostRow {
    id: Id,
    user: Id,
    title: String,
    content: String,
    image: String,
    artist_name: Option<String>,
    year_of_artwork: Option<i32>,
    is_private: bool,
}

struct CommentRow {
    id: Id,
    user: Id,
    post: Id,
    content: String,
}

/// A like, bookmark or follow: `user` points at `target`.
#[derive(Clone, Copy)]
struct Link {
    id: Id,
    user: Id,
    target: Id,
}

enum Fault {
    Status(u16),
    Network,
}

/// One request as the server received it.
#[derive(Debug, Clone)]
pub(crate) struct Logged {
    pub method: String,
    pub path: String,
    pub bearer: Option<String>,
}

/// Releases a request parked by [`FakeServer::hold`].
pub(crate) struct Gate(Arc<Notify>);

impl Gate {
    pub fn release(&self) {
        self.0.notify_one();
    }
}

// ── Server ──────────────────────────────────────────────────────────

pub(crate) struct FakeServer {
    db: Mutex<Db>,
    log: Mutex<Vec<Logged>>,
    faults: Mutex<Vec<(String, Fault)>>,
    holds: Mutex<Vec<(String, Arc<Notify>)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Remove and return the first entry whose needle occurs in `path`.
fn take_match<T>(entries: &Mutex<Vec<(String, T)>>, path: &str) -> Option<T> {
    let mut entries = lock(entries);
    let index = entries
        .iter()
        .position(|(needle, _)| path.contains(needle.as_str()))?;
    Some(entries.remove(index).1)
}

impl FakeServer {
    /// Users `ada` and `bo` (passwords `ada-pass`, `bo-pass`) with three
    /// posts each, alternating, no likes, follows or comments.
    pub fn seeded() -> Self {
        let mut db = Db {
            page_size: DEFAULT_PAGE_SIZE,
            ..Db::default()
        };
        db.create_user(ADA, "ada-pass", "Ada");
        db.create_user(BO, "bo-pass", "Bo");
        for (owner, title) in [
            (BO, "Sunflowers at noon"),
            (ADA, "Night market"),
            (BO, "Starry night over the river"),
            (ADA, "Blue hour"),
            (BO, "Sunflowers, second study"),
            (ADA, "Harbour at dawn"),
        ] {
            db.seed_post(owner, title);
        }
        Self {
            db: Mutex::new(db),
            log: Mutex::new(Vec::new()),
            faults: Mutex::new(Vec::new()),
            holds: Mutex::new(Vec::new()),
        }
    }

    // ── Seeding and inspection ──────────────────────────────────────

    pub fn set_page_size(&self, size: usize) {
        lock(&self.db).page_size = size.max(1);
    }

    pub fn seed_post(&self, username: &str, title: &str) -> Id {
        lock(&self.db).seed_post(username, title)
    }

    pub fn seed_comment(&self, username: &str, post: Id, content: &str) -> Id {
        let mut db = lock(&self.db);
        let user = db.user_named(username).id;
        let id = db.next_id();
        db.comments.push(CommentRow {
            id,
            user,
            post,
            content: content.to_string(),
        });
        id
    }

    pub fn seed_follow(&self, follower: &str, followed: &str) -> Id {
        let mut db = lock(&self.db);
        let user = db.user_named(follower).id;
        let target = db.profile_of(db.user_named(followed).id).id;
        let id = db.next_id();
        db.follows.push(Link { id, user, target });
        id
    }

    pub fn rename_post(&self, id: Id, title: &str) {
        let mut db = lock(&self.db);
        if let Some(post) = db.posts.iter_mut().find(|p| p.id == id) {
            post.title = title.to_string();
        }
    }

    pub fn rename_profile(&self, id: Id, name: &str) {
        let mut db = lock(&self.db);
        if let Some(profile) = db.profiles.iter_mut().find(|p| p.id == id) {
            profile.name = name.to_string();
        }
    }

    pub fn profile_id(&self, username: &str) -> Id {
        let db = lock(&self.db);
        db.profile_of(db.user_named(username).id).id
    }

    /// Every post id, newest first.
    pub fn post_ids(&self) -> Vec<Id> {
        let db = lock(&self.db);
        let mut ids: Vec<Id> = db.posts.iter().map(|p| p.id).collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids
    }

    pub fn first_post_id(&self) -> Id {
        self.post_ids()[0]
    }

    /// Newest post owned by `username`.
    pub fn post_by(&self, username: &str) -> Id {
        let db = lock(&self.db);
        let user = db.user_named(username).id;
        db.posts
            .iter()
            .filter(|p| p.user == user)
            .map(|p| p.id)
            .max()
            .expect("user has posts")
    }

    /// Answer removals with `200 {"detail": "unliked"}`-style bodies
    /// instead of `204`.
    pub fn use_legacy_sentinels(&self) {
        lock(&self.db).legacy_sentinels = true;
    }

    // ── Tokens ──────────────────────────────────────────────────────

    pub fn issue_tokens(&self, username: &str) -> StoredTokens {
        let mut db = lock(&self.db);
        let user = db.user_named(username).id;
        let (access, refresh) = db.mint(user);
        StoredTokens::new(access, refresh)
    }

    /// Every access token issued so far stops working.
    pub fn expire_access_tokens(&self) {
        lock(&self.db).access.clear();
    }

    pub fn revoke_refresh_tokens(&self) {
        lock(&self.db).refresh.clear();
    }

    pub fn refresh_calls(&self) -> usize {
        lock(&self.db).refresh_calls
    }

    /// Requests rejected because their bearer token was unknown.
    pub fn unauthorized_count(&self) -> usize {
        lock(&self.db).rejected_tokens
    }

    // ── Faults and holds ────────────────────────────────────────────

    /// Park the next request whose path contains `needle` until the
    /// returned gate is released.
    pub fn hold(&self, needle: &str) -> Gate {
        let notify = Arc::new(Notify::new());
        lock(&self.holds).push((needle.to_string(), Arc::clone(&notify)));
        Gate(notify)
    }

    /// Answer the next matching request with `status`.
    pub fn fail_next(&self, needle: &str, status: u16) {
        lock(&self.faults).push((needle.to_string(), Fault::Status(status)));
    }

    /// Drop the next matching request without a response.
    pub fn fail_network(&self, needle: &str) {
        lock(&self.faults).push((needle.to_string(), Fault::Network));
    }

    // ── Log ─────────────────────────────────────────────────────────

    pub fn requests(&self) -> Vec<Logged> {
        lock(&self.log).clone()
    }

    pub fn count(&self, needle: &str) -> usize {
        lock(&self.log)
            .iter()
            .filter(|r| r.path.contains(needle))
            .count()
    }

    pub fn clear_log(&self) {
        lock(&self.log).clear();
    }

    pub fn bearer_of_last(&self, needle: &str) -> Option<String> {
        lock(&self.log)
            .iter()
            .rev()
            .find(|r| r.path.contains(needle))
            .and_then(|r| r.bearer.clone())
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        lock(&self.log).push(Logged {
            method: request.method.as_str().to_string(),
            path: request.path.clone(),
            bearer: bearer.map(str::to_string),
        });

        match take_match(&self.faults, &request.path) {
            Some(Fault::Network) => return Err(ApiError::Network("connection reset".into())),
            Some(Fault::Status(status)) => return Ok(detail(status, "Simulated failure.")),
            None => {}
        }
        if let Some(gate) = take_match(&self.holds, &request.path) {
            gate.notified().await;
        }

        Ok(lock(&self.db).handle(request, bearer))
    }
}

// ── Responses ───────────────────────────────────────────────────────

fn reply(status: u16, body: Value) -> ApiResponse {
    ApiResponse::from_json(status, &body)
}

fn detail(status: u16, message: &str) -> ApiResponse {
    reply(status, json!({ "detail": message }))
}

fn invalid(field: &str, message: &str) -> ApiResponse {
    let mut body = Map::new();
    body.insert(field.to_string(), json!([message]));
    reply(400, Value::Object(body))
}

fn not_found() -> ApiResponse {
    detail(404, "Not found.")
}

fn forbidden() -> ApiResponse {
    detail(403, "You do not have permission to perform this action.")
}

fn anonymous() -> ApiResponse {
    detail(401, "Authentication credentials were not provided.")
}

fn stamp(id: Id) -> String {
    format!("2025-01-01T00:{:02}:00Z", id % 60)
}

fn media(filename: &str) -> String {
    format!("{ORIGIN}/media/{filename}")
}

// ── Request bodies ──────────────────────────────────────────────────

fn field(body: &RequestBody, name: &str) -> Option<String> {
    match body {
        RequestBody::Json(value) => value.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        RequestBody::Multipart(parts) => parts.iter().find(|p| p.name == name).and_then(|p| {
            match &p.value {
                PartValue::Text(text) => Some(text.clone()),
                PartValue::File { .. } => None,
            }
        }),
        RequestBody::Empty => None,
    }
}

fn text(body: &RequestBody, name: &str) -> String {
    field(body, name).unwrap_or_default()
}

fn id_field(body: &RequestBody, name: &str) -> Option<Id> {
    field(body, name)?.parse().ok()
}

fn file_name(body: &RequestBody, name: &str) -> Option<String> {
    let RequestBody::Multipart(parts) = body else {
        return None;
    };
    parts.iter().find(|p| p.name == name).and_then(|p| match &p.value {
        PartValue::File { filename, .. } => Some(filename.clone()),
        PartValue::Text(_) => None,
    })
}

type Params = HashMap<String, String>;

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |s| s.into_owned())
}

fn parse_id(raw: &str) -> Option<Id> {
    raw.parse().ok()
}

fn param_id(params: &Params, name: &str) -> Option<Id> {
    params.get(name)?.parse().ok()
}

// ── Database ────────────────────────────────────────────────────────

#[derive(Default)]
struct Db {
    users: Vec<User>,
    profiles: Vec<ProfileRow>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
    likes: Vec<Link>,
    bookmarks: Vec<Link>,
    follows: Vec<Link>,
    next_id: Id,
    access: HashMap<String, Id>,
    refresh: HashMap<String, Id>,
    token_seq: u64,
    page_size: usize,
    legacy_sentinels: bool,
    refresh_calls: usize,
    rejected_tokens: usize,
}

impl Db {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn create_user(&mut self, username: &str, password: &str, name: &str) -> Id {
        let id = self.next_id();
        self.users.push(User {
            id,
            username: username.to_string(),
            password: password.to_string(),
        });
        let profile = self.next_id();
        self.profiles.push(ProfileRow {
            id: profile,
            user: id,
            name: name.to_string(),
            content: String::new(),
            image: None,
        });
        id
    }

    fn seed_post(&mut self, username: &str, title: &str) -> Id {
        let user = self.user_named(username).id;
        let id = self.next_id();
        self.posts.push(PostRow {
            id,
            user,
            title: title.to_string(),
            content: "Oil on canvas.".to_string(),
            image: media(&format!("{id}.jpg")),
            artist_name: None,
            year_of_artwork: None,
            is_private: false,
        });
        id
    }

    fn mint(&mut self, user: Id) -> (String, String) {
        self.token_seq += 1;
        let access = format!("access-{}", self.token_seq);
        let refresh = format!("refresh-{}", self.token_seq);
        self.access.insert(access.clone(), user);
        self.refresh.insert(refresh.clone(), user);
        (access, refresh)
    }

    fn user(&self, id: Id) -> &User {
        self.users.iter().find(|u| u.id == id).expect("user exists")
    }

    fn user_named(&self, username: &str) -> &User {
        self.users
            .iter()
            .find(|u| u.username == username)
            .expect("user exists")
    }

    fn profile_of(&self, user: Id) -> &ProfileRow {
        self.profiles
            .iter()
            .find(|p| p.user == user)
            .expect("every user has a profile")
    }

    fn owner_of_profile(&self, profile: Id) -> Option<Id> {
        self.profiles.iter().find(|p| p.id == profile).map(|p| p.user)
    }

    // ── Dispatch ────────────────────────────────────────────────────

    fn handle(&mut self, request: &ApiRequest, bearer: Option<&str>) -> ApiResponse {
        let raw = request.path.strip_prefix(ORIGIN).unwrap_or(&request.path);
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let params: Params = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (decode(k), decode(v)))
            .collect();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        let viewer = match bearer {
            Some(token) => match self.access.get(token) {
                Some(user) => Some(*user),
                None => {
                    self.rejected_tokens += 1;
                    return reply(
                        401,
                        json!({
                            "detail": "Given token not valid for any token type",
                            "code": "token_not_valid",
                        }),
                    );
                }
            },
            None => None,
        };
        let body = &request.body;

        match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["auth", "login"]) => self.login(body),
            ("POST", ["auth", "register"]) => self.register(body),
            ("POST", ["auth", "refresh"]) => self.refresh(body),
            ("GET", ["auth", "me"]) => match viewer {
                Some(user) => reply(200, self.identity_json(user)),
                None => anonymous(),
            },
            ("POST", ["auth", "change-password"]) => match viewer {
                Some(user) => self.change_password(user, body),
                None => anonymous(),
            },

            ("GET", ["posts"]) => self.list_posts(viewer, &params),
            ("GET", ["posts", post]) => match parse_id(post).and_then(|p| self.visible_post(viewer, p)) {
                Some(post) => reply(200, self.post_json(post, viewer)),
                None => not_found(),
            },
            ("POST", ["posts"]) => match viewer {
                Some(user) => self.create_post(user, body),
                None => anonymous(),
            },
            ("PUT", ["posts", post]) => match (viewer, parse_id(post)) {
                (Some(user), Some(post)) => self.update_post(user, post, body),
                (None, _) => anonymous(),
                _ => not_found(),
            },
            ("DELETE", ["posts", post]) => match (viewer, parse_id(post)) {
                (Some(user), Some(post)) => self.delete_post(user, post),
                (None, _) => anonymous(),
                _ => not_found(),
            },

            ("GET", ["comments"]) => self.list_comments(viewer, &params),
            ("POST", ["comments"]) => match viewer {
                Some(user) => self.create_comment(user, body),
                None => anonymous(),
            },
            ("PUT", ["comments", comment]) => match (viewer, parse_id(comment)) {
                (Some(user), Some(comment)) => self.update_comment(user, comment, body),
                (None, _) => anonymous(),
                _ => not_found(),
            },
            ("DELETE", ["comments", comment]) => match (viewer, parse_id(comment)) {
                (Some(user), Some(comment)) => self.delete_comment(user, comment),
                (None, _) => anonymous(),
                _ => not_found(),
            },

            ("POST", ["likes"]) => match viewer {
                Some(user) => self.toggle_like(user, body),
                None => anonymous(),
            },
            ("POST", ["bookmarks"]) => match viewer {
                Some(user) => self.toggle_bookmark(user, body),
                None => anonymous(),
            },
            ("POST", ["followers"]) => match viewer {
                Some(user) => self.follow(user, body),
                None => anonymous(),
            },
            ("DELETE", ["followers", link]) => match (viewer, parse_id(link)) {
                (Some(user), Some(link)) => self.unfollow(user, link),
                (None, _) => anonymous(),
                _ => not_found(),
            },

            ("GET", ["profiles"]) => self.list_profiles(viewer, &params),
            ("GET", ["profiles", profile]) => {
                match parse_id(profile).and_then(|p| self.profiles.iter().find(|row| row.id == p)) {
                    Some(row) => reply(200, self.profile_json(row, viewer)),
                    None => not_found(),
                }
            }
            ("PUT", ["profiles", profile]) => match (viewer, parse_id(profile)) {
                (Some(user), Some(profile)) => self.update_profile(user, profile, body),
                (None, _) => anonymous(),
                _ => not_found(),
            },

            _ => not_found(),
        }
    }

    // ── Serializers ─────────────────────────────────────────────────

    fn identity_json(&self, user: Id) -> Value {
        let profile = self.profile_of(user);
        json!({
            "pk": user,
            "username": self.user(user).username,
            "profile_id": profile.id,
            "profile_image": profile.image,
        })
    }

    fn post_json(&self, post: &PostRow, viewer: Option<Id>) -> Value {
        let profile = self.profile_of(post.user);
        let mine = |links: &[Link]| {
            viewer.and_then(|v| {
                links
                    .iter()
                    .find(|l| l.user == v && l.target == post.id)
                    .map(|l| l.id)
            })
        };
        json!({
            "id": post.id,
            "owner": self.user(post.user).username,
            "owner_id": post.user,
            "profile_id": profile.id,
            "profile_image": profile.image,
            "title": post.title,
            "content": post.content,
            "image": post.image,
            "artist_name": post.artist_name,
            "year_of_artwork": post.year_of_artwork,
            "is_private": post.is_private,
            "likes_count": self.likes.iter().filter(|l| l.target == post.id).count(),
            "comments_count": self.comments.iter().filter(|c| c.post == post.id).count(),
            "like_id": mine(&self.likes),
            "bookmark_id": mine(&self.bookmarks),
            "is_owner": viewer == Some(post.user),
            "created_at": stamp(post.id),
            "updated_at": stamp(post.id),
        })
    }

    fn comment_json(&self, comment: &CommentRow, viewer: Option<Id>) -> Value {
        let profile = self.profile_of(comment.user);
        json!({
            "id": comment.id,
            "owner": self.user(comment.user).username,
            "is_owner": viewer == Some(comment.user),
            "profile_id": profile.id,
            "profile_image": profile.image,
            "post": comment.post,
            "content": comment.content,
            "created_at": stamp(comment.id),
            "updated_at": stamp(comment.id),
        })
    }

    fn profile_json(&self, profile: &ProfileRow, viewer: Option<Id>) -> Value {
        let following_id = viewer.and_then(|v| {
            self.follows
                .iter()
                .find(|f| f.user == v && f.target == profile.id)
                .map(|f| f.id)
        });
        json!({
            "id": profile.id,
            "owner": self.user(profile.user).username,
            "name": profile.name,
            "content": profile.content,
            "image": profile.image,
            "is_owner": viewer == Some(profile.user),
            "following_id": following_id,
            "posts_count": self.posts.iter().filter(|p| p.user == profile.user).count(),
            "followers_count": self.follows.iter().filter(|f| f.target == profile.id).count(),
            "following_count": self.follows.iter().filter(|f| f.user == profile.user).count(),
            "created_at": stamp(profile.id),
            "updated_at": stamp(profile.id),
        })
    }

    fn paginate(&self, items: Vec<Value>, path: &str, params: &Params) -> ApiResponse {
        let page = param_id(params, "page").unwrap_or(1).max(1) as usize;
        let start = (page - 1) * self.page_size;
        if page > 1 && start >= items.len() {
            return detail(404, "Invalid page.");
        }
        let results: Vec<Value> = items.iter().skip(start).take(self.page_size).cloned().collect();
        let next = (start + self.page_size < items.len()).then(|| {
            let mut pairs: Vec<String> = params
                .iter()
                .filter(|(k, _)| k.as_str() != "page")
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect();
            pairs.sort();
            pairs.push(format!("page={}", page + 1));
            format!("{ORIGIN}{path}?{}", pairs.join("&"))
        });
        reply(
            200,
            json!({
                "count": items.len(),
                "next": next,
                "previous": null,
                "results": results,
            }),
        )
    }

    // ── Auth ────────────────────────────────────────────────────────

    fn signed_in(&mut self, user: Id, status: u16) -> ApiResponse {
        let (access, refresh) = self.mint(user);
        reply(
            status,
            json!({
                "access": access,
                "refresh": refresh,
                "user": self.identity_json(user),
            }),
        )
    }

    fn login(&mut self, body: &RequestBody) -> ApiResponse {
        let username = text(body, "username");
        let password = text(body, "password");
        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .map(|u| u.id);
        match user {
            Some(user) => self.signed_in(user, 200),
            None => detail(401, "No active account found with the given credentials"),
        }
    }

    fn register(&mut self, body: &RequestBody) -> ApiResponse {
        let username = text(body, "username");
        let password1 = text(body, "password1");
        if username.trim().is_empty() {
            return invalid("username", "This field is required.");
        }
        if self.users.iter().any(|u| u.username == username) {
            return invalid("username", "A user with that username already exists.");
        }
        if password1 != text(body, "password2") {
            return invalid("password2", "The two password fields didn't match.");
        }
        let user = self.create_user(&username, &password1, &username);
        self.signed_in(user, 201)
    }

    fn refresh(&mut self, body: &RequestBody) -> ApiResponse {
        self.refresh_calls += 1;
        let Some(user) = self.refresh.get(&text(body, "refresh")).copied() else {
            return reply(
                401,
                json!({ "detail": "Token is invalid or expired", "code": "token_not_valid" }),
            );
        };
        self.token_seq += 1;
        let access = format!("access-{}", self.token_seq);
        self.access.insert(access.clone(), user);
        reply(200, json!({ "access": access }))
    }

    fn change_password(&mut self, user: Id, body: &RequestBody) -> ApiResponse {
        let new = text(body, "new_password1");
        if self.user(user).password != text(body, "current_password") {
            return invalid("current_password", "Your old password was entered incorrectly.");
        }
        if new != text(body, "new_password2") {
            return invalid("new_password2", "The two password fields didn't match.");
        }
        if let Some(row) = self.users.iter_mut().find(|u| u.id == user) {
            row.password = new;
        }
        detail(200, "New password has been saved.")
    }

    // ── Posts ───────────────────────────────────────────────────────

    fn visible_post(&self, viewer: Option<Id>, id: Id) -> Option<&PostRow> {
        self.posts
            .iter()
            .find(|p| p.id == id && (!p.is_private || viewer == Some(p.user)))
    }

    fn list_posts(&self, viewer: Option<Id>, params: &Params) -> ApiResponse {
        let mut rows: Vec<&PostRow> = self
            .posts
            .iter()
            .filter(|p| !p.is_private || viewer == Some(p.user))
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        if let Some(profile) = param_id(params, "owner__profile") {
            let owner = self.owner_of_profile(profile);
            rows.retain(|p| Some(p.user) == owner);
        }
        if let Some(profile) = param_id(params, "owner__followed__owner__profile") {
            let follower = self.owner_of_profile(profile);
            let followed: Vec<Option<Id>> = self
                .follows
                .iter()
                .filter(|f| Some(f.user) == follower)
                .map(|f| self.owner_of_profile(f.target))
                .collect();
            rows.retain(|p| followed.contains(&Some(p.user)));
        }
        if let Some(profile) = param_id(params, "likes__owner__profile") {
            let liker = self.owner_of_profile(profile);
            let like_of = |post: Id| {
                self.likes
                    .iter()
                    .find(|l| Some(l.user) == liker && l.target == post)
                    .map(|l| l.id)
            };
            rows.retain(|p| like_of(p.id).is_some());
            if params.get("ordering").map(String::as_str) == Some("-likes__created_at") {
                rows.sort_by_key(|p| std::cmp::Reverse(like_of(p.id)));
            }
        }
        if let Some(profile) = param_id(params, "bookmarks__owner__profile") {
            let owner = self.owner_of_profile(profile);
            rows.retain(|p| {
                self.bookmarks
                    .iter()
                    .any(|b| Some(b.user) == owner && b.target == p.id)
            });
        }
        if let Some(term) = params.get("search").map(|s| s.to_lowercase()) {
            rows.retain(|p| {
                p.title.to_lowercase().contains(&term) || p.content.to_lowercase().contains(&term)
            });
        }

        let items = rows.into_iter().map(|p| self.post_json(p, viewer)).collect();
        self.paginate(items, "/posts", params)
    }

    fn create_post(&mut self, user: Id, body: &RequestBody) -> ApiResponse {
        let title = text(body, "title");
        let image = file_name(body, "image");
        let mut errors = Map::new();
        if title.trim().is_empty() {
            errors.insert("title".into(), json!(["This field is required."]));
        }
        if image.is_none() {
            errors.insert("image".into(), json!(["No file was submitted."]));
        }
        let Some(image) = image.filter(|_| errors.is_empty()) else {
            return reply(400, Value::Object(errors));
        };

        let id = self.next_id();
        self.posts.push(PostRow {
            id,
            user,
            title,
            content: text(body, "content"),
            image: media(&image),
            artist_name: field(body, "artist_name").filter(|a| !a.is_empty()),
            year_of_artwork: field(body, "year_of_artwork").and_then(|y| y.parse().ok()),
            is_private: field(body, "is_private").as_deref() == Some("true"),
        });
        let row = self.posts.last().expect("just pushed");
        reply(201, self.post_json(row, Some(user)))
    }

    fn update_post(&mut self, user: Id, id: Id, body: &RequestBody) -> ApiResponse {
        let Some(index) = self.posts.iter().position(|p| p.id == id) else {
            return not_found();
        };
        if self.posts[index].user != user {
            return forbidden();
        }
        let title = text(body, "title");
        if title.trim().is_empty() {
            return invalid("title", "This field is required.");
        }
        let row = &mut self.posts[index];
        row.title = title;
        row.content = text(body, "content");
        row.artist_name = field(body, "artist_name").filter(|a| !a.is_empty());
        row.year_of_artwork = field(body, "year_of_artwork").and_then(|y| y.parse().ok());
        row.is_private = field(body, "is_private").as_deref() == Some("true");
        if let Some(image) = file_name(body, "image") {
            row.image = media(&image);
        }
        reply(200, self.post_json(&self.posts[index], Some(user)))
    }

    fn delete_post(&mut self, user: Id, id: Id) -> ApiResponse {
        let Some(post) = self.posts.iter().find(|p| p.id == id) else {
            return not_found();
        };
        if post.user != user {
            return forbidden();
        }
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post != id);
        self.likes.retain(|l| l.target != id);
        self.bookmarks.retain(|b| b.target != id);
        ApiResponse::empty(204)
    }

    // ── Comments ────────────────────────────────────────────────────

    fn list_comments(&self, viewer: Option<Id>, params: &Params) -> ApiResponse {
        let post = param_id(params, "post");
        let mut rows: Vec<&CommentRow> = self
            .comments
            .iter()
            .filter(|c| post.is_none_or(|p| c.post == p))
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        let items = rows.into_iter().map(|c| self.comment_json(c, viewer)).collect();
        self.paginate(items, "/comments", params)
    }

    fn create_comment(&mut self, user: Id, body: &RequestBody) -> ApiResponse {
        let content = text(body, "content");
        if content.trim().is_empty() {
            return invalid("content", "This field is required.");
        }
        let Some(post) = id_field(body, "post").filter(|p| self.posts.iter().any(|row| row.id == *p))
        else {
            return invalid("post", "Invalid pk - object does not exist.");
        };
        let id = self.next_id();
        self.comments.push(CommentRow {
            id,
            user,
            post,
            content,
        });
        let row = self.comments.last().expect("just pushed");
        reply(201, self.comment_json(row, Some(user)))
    }

    fn update_comment(&mut self, user: Id, id: Id, body: &RequestBody) -> ApiResponse {
        let Some(index) = self.comments.iter().position(|c| c.id == id) else {
            return not_found();
        };
        if self.comments[index].user != user {
            return forbidden();
        }
        let content = text(body, "content");
        if content.trim().is_empty() {
            return invalid("content", "This field is required.");
        }
        self.comments[index].content = content;
        reply(200, self.comment_json(&self.comments[index], Some(user)))
    }

    fn delete_comment(&mut self, user: Id, id: Id) -> ApiResponse {
        let Some(comment) = self.comments.iter().find(|c| c.id == id) else {
            return not_found();
        };
        if comment.user != user {
            return forbidden();
        }
        self.comments.retain(|c| c.id != id);
        ApiResponse::empty(204)
    }

    // ── Relations ───────────────────────────────────────────────────

    fn toggle_like(&mut self, user: Id, body: &RequestBody) -> ApiResponse {
        let Some(owner) = id_field(body, "post")
            .and_then(|p| self.posts.iter().find(|row| row.id == p))
            .map(|row| row.user)
        else {
            return invalid("post", "Invalid pk - object does not exist.");
        };
        if owner == user {
            return detail(400, "You cannot like your own post.");
        }
        self.toggle_link(user, body, Relation::Like)
    }

    fn toggle_bookmark(&mut self, user: Id, body: &RequestBody) -> ApiResponse {
        if !id_field(body, "post").is_some_and(|p| self.posts.iter().any(|row| row.id == p)) {
            return invalid("post", "Invalid pk - object does not exist.");
        }
        self.toggle_link(user, body, Relation::Bookmark)
    }

    fn toggle_link(&mut self, user: Id, body: &RequestBody, relation: Relation) -> ApiResponse {
        let target = id_field(body, "post").unwrap_or_default();
        let legacy = self.legacy_sentinels;
        let links = match relation {
            Relation::Like => &mut self.likes,
            Relation::Bookmark => &mut self.bookmarks,
        };
        if let Some(index) = links.iter().position(|l| l.user == user && l.target == target) {
            links.remove(index);
            return match (legacy, relation) {
                (false, _) => ApiResponse::empty(204),
                (true, Relation::Like) => detail(200, "unliked"),
                (true, Relation::Bookmark) => detail(200, "bookmark removed"),
            };
        }
        let id = self.next_id();
        let link = Link { id, user, target };
        match relation {
            Relation::Like => self.likes.push(link),
            Relation::Bookmark => self.bookmarks.push(link),
        }
        reply(
            201,
            json!({
                "id": id,
                "owner": self.user(user).username,
                "post": target,
                "created_at": stamp(id),
            }),
        )
    }

    fn follow(&mut self, user: Id, body: &RequestBody) -> ApiResponse {
        let Some(target) = id_field(body, "followed")
            .filter(|p| self.profiles.iter().any(|row| row.id == *p))
        else {
            return invalid("followed", "Invalid pk - object does not exist.");
        };
        if self.owner_of_profile(target) == Some(user) {
            return detail(400, "You can't follow yourself.");
        }
        if self.follows.iter().any(|f| f.user == user && f.target == target) {
            return detail(400, "possible duplicate");
        }
        let id = self.next_id();
        self.follows.push(Link { id, user, target });
        reply(
            201,
            json!({
                "id": id,
                "owner": self.user(user).username,
                "followed": target,
                "created_at": stamp(id),
            }),
        )
    }

    fn unfollow(&mut self, user: Id, id: Id) -> ApiResponse {
        let Some(link) = self.follows.iter().find(|f| f.id == id) else {
            return not_found();
        };
        if link.user != user {
            return forbidden();
        }
        self.follows.retain(|f| f.id != id);
        ApiResponse::empty(204)
    }

    // ── Profiles ────────────────────────────────────────────────────

    fn list_profiles(&self, viewer: Option<Id>, params: &Params) -> ApiResponse {
        let followers = |p: &ProfileRow| self.follows.iter().filter(|f| f.target == p.id).count();
        let mut rows: Vec<&ProfileRow> = self.profiles.iter().collect();
        if params.get("ordering").map(String::as_str) == Some("-followers_count") {
            rows.sort_by(|a, b| followers(b).cmp(&followers(a)).then(a.id.cmp(&b.id)));
        }
        let items = rows.into_iter().map(|p| self.profile_json(p, viewer)).collect();
        self.paginate(items, "/profiles", params)
    }

    fn update_profile(&mut self, user: Id, id: Id, body: &RequestBody) -> ApiResponse {
        let Some(index) = self.profiles.iter().position(|p| p.id == id) else {
            return not_found();
        };
        if self.profiles[index].user != user {
            return forbidden();
        }
        let row = &mut self.profiles[index];
        row.name = text(body, "name");
        row.content = text(body, "content");
        if let Some(image) = file_name(body, "image") {
            row.image = Some(media(&image));
        }
        reply(200, self.profile_json(&self.profiles[index], Some(user)))
    }
}

#[derive(Clone, Copy)]
enum Relation {
    Like,
    Bookmark,
}

// ── Harness ─────────────────────────────────────────────────────────

/// A gallery wired to a fresh [`FakeServer`].
pub(crate) struct Harness {
    pub server: Arc<FakeServer>,
    pub store: Arc<StateStore>,
    pub tokens: Arc<MemoryTokenStorage>,
    pub gallery: Arc<Gallery>,
}

impl Harness {
    /// Signed in as `ada`, with the login request cleared from the log.
    pub async fn new() -> Self {
        let h = Self::anonymous();
        h.gallery
            .session()
            .login(ADA, "ada-pass")
            .await
            .expect("seeded login");
        h.server.clear_log();
        h
    }

    /// Nothing persisted; the session is still `Loading` until restored.
    pub fn anonymous() -> Self {
        Self::with_tokens(|_| StoredTokens::default())
    }

    /// Start with whatever tokens `persisted` returns already in storage.
    pub fn with_tokens(persisted: impl FnOnce(&FakeServer) -> StoredTokens) -> Self {
        let server = Arc::new(FakeServer::seeded());
        let tokens = Arc::new(MemoryTokenStorage::with_tokens(persisted(&server)));
        let store = Arc::new(StateStore::new());
        let gallery = Arc::new(Gallery::new(
            Arc::clone(&store),
            server.clone(),
            Endpoints::default(),
            tokens.clone(),
        ));
        Self {
            server,
            store,
            tokens,
            gallery,
        }
    }
}
