//! Auth middleware.

use std::sync::Arc;

use salvo::{Scribe, prelude::*};

use crate::{
    auth::{into_api_error, session_token},
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Resolve the caller's session and make it available to later handlers.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = session_token(req) else {
        ApiError::unauthorized("You need to sign in first").render(res);
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => Arc::clone(state),
        Err(error) => {
            error.render(res);
            ctrl.skip_rest();

            return;
        }
    };

    match state.app.auth.authenticate_session(&token).await {
        Ok(session) => {
            depot.insert_session(session);
            ctrl.call_next(req, depot, res).await;
        }
        Err(error) => {
            into_api_error(error).render(res);
            ctrl.skip_rest();
        }
    }
}
