//! List Invites Handler

use std::sync::Arc;

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scholarlink_app::domain::invites::data::InviteFilter;

use crate::{
    errors::ApiError,
    extensions::*,
    invites::{InviteResponse, into_api_error},
    state::State,
};

/// List Invites Request
///
/// `from` and `to` take an RFC 3339 timestamp or a plain `YYYY-MM-DD` date,
/// which covers the whole day in UTC.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ListInvitesRequest {
    pub matric_number: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,

    /// `nextCursor` of the previous page.
    pub cursor: Option<Uuid>,

    /// Page size, at most 20.
    pub limit: Option<usize>,
}

/// List Invites Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListInvitesResponse {
    pub success: bool,
    pub invites: Vec<InviteResponse>,
    pub next_cursor: Option<Uuid>,
}

impl ListInvitesRequest {
    fn into_filter(self) -> Result<InviteFilter, ApiError> {
        Ok(InviteFilter {
            matric_number: self
                .matric_number
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            created_from: self
                .from
                .as_deref()
                .map(|value| parse_bound(value, false))
                .transpose()?,
            created_to: self
                .to
                .as_deref()
                .map(|value| parse_bound(value, true))
                .transpose()?,
            before: self.cursor.map(Into::into),
            limit: self.limit,
        })
    }
}

fn parse_bound(value: &str, end_of_day: bool) -> Result<Timestamp, ApiError> {
    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    let date = value
        .parse::<Date>()
        .or_400("dates must be YYYY-MM-DD or RFC 3339 timestamps")?;

    let datetime = if end_of_day {
        date.at(23, 59, 59, 999_999_999)
    } else {
        date.at(0, 0, 0, 0)
    };

    datetime
        .to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .or_400("date is out of range")
}

/// List Invites Handler
#[endpoint(
    tags("invites"),
    summary = "List invites of the school",
    security(("session_cookie" = []))
)]
pub(crate) async fn handler(
    json: JsonBody<ListInvitesRequest>,
    depot: &mut Depot,
) -> Result<Json<ListInvitesResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let page = state
        .app
        .invites
        .list_invites(session.actor(), json.into_inner().into_filter()?)
        .await
        .map_err(into_api_error)?;

    Ok(Json(ListInvitesResponse {
        success: true,
        invites: page.items.iter().map(InviteResponse::from).collect(),
        next_cursor: page.next_cursor.map(Into::into),
    }))
}
