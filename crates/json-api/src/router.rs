//! App Router

use salvo::Router;

use crate::{accounts, auth, courses, healthcheck, invites, logs, observability, payments};

/// Routes reachable without a session.
pub(crate) fn public_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("auth")
                .push(Router::with_path("sign-up").post(accounts::handlers::sign_up::handler))
                .push(Router::with_path("sign-in").post(auth::handlers::sign_in::handler))
                .push(
                    Router::with_path("otp")
                        .push(Router::with_path("send").post(accounts::handlers::otp::send))
                        .push(Router::with_path("verify").post(accounts::handlers::otp::verify)),
                ),
        )
        .push(Router::with_path("invite/add-user").post(invites::handlers::add_user::handler))
        .push(Router::with_path("paystack/webhook").post(payments::handlers::webhook::handler))
}

/// Routes behind the session middleware.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(Router::with_path("auth/sign-out").post(auth::handlers::sign_out::handler))
        .push(Router::with_path("users/me").get(accounts::handlers::me::handler))
        .push(
            Router::with_path("invite")
                .push(Router::with_path("create").post(invites::handlers::create::handler))
                .push(Router::with_path("get").post(invites::handlers::get::handler))
                .push(Router::with_path("edit").post(invites::handlers::edit::handler))
                .push(Router::with_path("delete").post(invites::handlers::delete::handler)),
        )
        .push(Router::with_path("paystack/pay").post(payments::handlers::pay::handler))
        .push(
            Router::with_path("courses")
                .get(courses::handlers::index::handler)
                .post(courses::handlers::create::handler)
                .push(
                    Router::with_path("{course}")
                        .delete(courses::handlers::delete::handler)
                        .push(
                            Router::with_path("admins")
                                .post(courses::handlers::admins::assign)
                                .push(
                                    Router::with_path("{user}")
                                        .delete(courses::handlers::admins::remove),
                                ),
                        )
                        .push(
                            Router::with_path("results")
                                .get(courses::handlers::results::index)
                                .post(courses::handlers::results::upload),
                        ),
                ),
        )
        .push(Router::with_path("logs/get").post(logs::handlers::get::handler))
}
