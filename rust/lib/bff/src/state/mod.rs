//! State definitions.
//!
//! Each file defines the state stored at one path or path family. Views
//! read these with `Flux::get_as` and subscribe to their paths.

pub mod app;
pub mod collection;
pub mod detail;
pub mod form;
pub mod session;

pub use app::{AppRoute, Notice, NoticeKind};
pub use collection::{End, Paginated};
pub use detail::{Detail, PostDetail, ProfileDetail};
pub use form::FormState;
pub use session::{SessionPhase, SessionState};
