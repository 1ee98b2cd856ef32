//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use scholarlink_app::{
    auth::{AuthenticatedSession, MockAuthService, PasswordHash},
    context::AppContext,
    domain::{
        accounts::MockAccountsService,
        audit::MockAuditService,
        courses::MockCoursesService,
        invites::MockInvitesService,
        results::MockResultsService,
        schools::records::{SchoolRecord, SchoolUuid},
        subscriptions::MockSubscriptionsService,
        users::records::{RoleDetails, StudentDetails, UserRecord, UserUuid},
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_SCHOOL_UUID: SchoolUuid = SchoolUuid::from_uuid(Uuid::from_u128(1));
pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(2));

/// Mocked services. A mock without expectations fails on any call.
#[derive(Default)]
pub(crate) struct TestApp {
    pub(crate) auth: MockAuthService,
    pub(crate) accounts: MockAccountsService,
    pub(crate) invites: MockInvitesService,
    pub(crate) subscriptions: MockSubscriptionsService,
    pub(crate) courses: MockCoursesService,
    pub(crate) results: MockResultsService,
    pub(crate) audit: MockAuditService,
}

impl TestApp {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(
            AppContext {
                auth: Arc::new(self.auth),
                accounts: Arc::new(self.accounts),
                invites: Arc::new(self.invites),
                subscriptions: Arc::new(self.subscriptions),
                courses: Arc::new(self.courses),
                results: Arc::new(self.results),
                audit: Arc::new(self.audit),
            },
            true,
        )
    }

    /// Serve `route` without a signed-in user.
    pub(crate) fn public_service(self, route: Router) -> Service {
        Service::new(Router::new().hoop(inject(self.into_state())).push(route))
    }

    /// Serve `route` as if the auth middleware had resolved `session`.
    pub(crate) fn service_as(self, session: AuthenticatedSession, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(InjectSession(session))
                .push(route),
        )
    }
}

struct InjectSession(AuthenticatedSession);

#[handler]
impl InjectSession {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        depot.insert_session(self.0.clone());
        ctrl.call_next(req, depot, res).await;
    }
}

pub(crate) fn school() -> SchoolRecord {
    SchoolRecord {
        uuid: TEST_SCHOOL_UUID,
        code: "SCH-0000BEEF".to_string(),
        name: "Ridgeway College".to_string(),
        address: "1 School Road".to_string(),
        current_session: "2024/2025".parse().ok(),
        image_url: None,
        paid: false,
        payment_date: None,
        subscription_expires_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn user(uuid: UserUuid, details: RoleDetails) -> UserRecord {
    UserRecord {
        uuid,
        school_uuid: TEST_SCHOOL_UUID,
        name: "Ada Obi".to_string(),
        email: format!("{}@example.com", uuid.into_uuid().simple()),
        password_hash: PasswordHash::from_phc("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string()),
        details,
        verified: true,
        image_url: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn student(uuid: UserUuid) -> UserRecord {
    user(
        uuid,
        RoleDetails::Student(StudentDetails {
            matric_number: Some("MAT-001".to_string()),
            class_name: "JSS1".to_string(),
            ..StudentDetails::default()
        }),
    )
}

pub(crate) fn session_for(user: UserRecord) -> AuthenticatedSession {
    AuthenticatedSession {
        session_uuid: Uuid::from_u128(3),
        user,
        school: school(),
    }
}

pub(crate) fn admin_session() -> AuthenticatedSession {
    session_for(user(TEST_USER_UUID, RoleDetails::Admin))
}
