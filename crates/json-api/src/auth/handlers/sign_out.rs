//! Sign Out Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    auth::{cleared_session_cookie, into_api_error, session_token},
    errors::{ApiError, MessageResponse},
    extensions::*,
    state::State,
};

/// Sign Out Handler
#[endpoint(tags("auth"), summary = "Sign Out", security(("session_cookie" = [])))]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let token = session_token(req).ok_or_else(|| ApiError::unauthorized("You need to sign in first"))?;

    state
        .app
        .auth
        .sign_out(&token)
        .await
        .map_err(into_api_error)?;

    res.add_cookie(cleared_session_cookie(state.cookie_secure));

    Ok(MessageResponse::ok("Signed out"))
}

#[cfg(test)]
mod tests {
    use salvo::{
        http::{cookie::time::Duration, header::COOKIE},
        test::TestClient,
    };
    use scholarlink_app::auth::MockAuthService;

    use crate::{auth::SESSION_COOKIE, test_helpers::TestApp};

    use super::*;

    #[tokio::test]
    async fn sign_out_revokes_and_clears_the_cookie() {
        let mut auth = MockAuthService::new();

        auth.expect_sign_out()
            .once()
            .withf(|token| token == "sl_v1_abc.def")
            .return_once(|_| Ok(()));

        let service = TestApp {
            auth,
            ..TestApp::default()
        }
        .public_service(Router::with_path("auth/sign-out").post(handler));

        let res = TestClient::post("http://example.com/auth/sign-out")
            .add_header(COOKIE, format!("{SESSION_COOKIE}=sl_v1_abc.def"), true)
            .send(&service)
            .await;

        let cleared = res
            .cookie(SESSION_COOKIE)
            .is_some_and(|cookie| cookie.value().is_empty() && cookie.max_age() == Some(Duration::ZERO));

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(cleared, "sign out should expire the session cookie");
    }
}
