//! Shared fixtures for project service tests.

use std::sync::Arc;

use crate::board::adapters::memory::InMemoryBoardRepository;
use crate::identity::domain::{Email, Profile, Session, SessionContext, UserId};
use crate::notification::adapters::memory::RecordingNotifier;
use crate::project::{adapters::memory::InMemoryProjectRepository, services::ProjectService};
use chrono::Utc;
use mockable::DefaultClock;
use rstest::fixture;

pub(super) type TestService = ProjectService<
    InMemoryProjectRepository,
    InMemoryBoardRepository,
    RecordingNotifier,
    DefaultClock,
>;

pub(super) struct Harness {
    pub service: TestService,
    pub projects: Arc<InMemoryProjectRepository>,
    pub boards: Arc<InMemoryBoardRepository>,
    pub notifier: Arc<RecordingNotifier>,
}

#[fixture]
pub(super) fn harness() -> Harness {
    let projects = Arc::new(InMemoryProjectRepository::new());
    let boards = Arc::new(InMemoryBoardRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let service = ProjectService::new(
        Arc::clone(&projects),
        Arc::clone(&boards),
        Arc::clone(&notifier),
        Arc::new(DefaultClock),
    );
    Harness {
        service,
        projects,
        boards,
        notifier,
    }
}

pub(super) fn signed_in(email: &str) -> SessionContext {
    let address = Email::new(email).expect("valid email");
    SessionContext::authenticated(Session::new(UserId::new(), address))
}

pub(super) fn admin(email: &str) -> SessionContext {
    let ctx = signed_in(email);
    let user_id = ctx.session().expect("signed in").user_id();
    let now = Utc::now();
    ctx.with_profile(Profile {
        id: user_id,
        username: Some("admin".to_owned()),
        avatar_url: None,
        is_admin: true,
        created_at: now,
        updated_at: now,
    })
}
