//! Invites service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rand::{RngCore, rngs::OsRng};
use sqlx::{PgPool, error::ErrorKind};
use tracing::{error, info, warn};

use crate::{
    auth::hash_password,
    domain::{
        audit::{
            AuditTrail,
            records::{AuditAction, NewAuditLog},
        },
        invites::{
            data::{InviteEdit, InviteEntry, InviteFilter, NewInvite, ProfileImage, Redemption},
            errors::{InviteValidationError, InvitesServiceError},
            records::{InviteRecord, InviteUuid},
            repository::{InviteQuery, InvitesRepository, PgInvitesRepository},
            template::InviteEmail,
            validation::{
                apply_edit, unique_emails, unique_matric_numbers, validate_entry,
                validate_password,
            },
        },
        pagination::{Page, page_size},
        schools::{PgSchoolsRepository, SchoolsRepository},
        users::{
            MATRIC_NUMBER_CONSTRAINT, PgUsersRepository, UsersRepository,
            data::NewUser,
            records::{Actor, RoleDetails, UserRecord, UserUuid},
        },
    },
    hex,
    integrations::{Mailer, ObjectStorage, StoredObject},
};

/// Random bytes behind each invite token.
const INVITE_TOKEN_BYTES: usize = 32;

/// How long an invite stays redeemable.
pub const DEFAULT_INVITE_TTL: SignedDuration = SignedDuration::from_hours(24);

/// Invite link target and lifetime.
#[derive(Debug, Clone)]
pub struct InviteSettings {
    /// Frontend page the invite link points at; the token is appended as a query parameter.
    pub signup_url: String,

    /// How long a new invite stays redeemable.
    pub ttl: SignedDuration,
}

/// Invite issuing and redemption over Postgres.
#[derive(Clone)]
pub struct PgInvitesService {
    invites: Arc<dyn InvitesRepository>,
    users: Arc<dyn UsersRepository>,
    schools: Arc<dyn SchoolsRepository>,
    mailer: Arc<dyn Mailer>,
    storage: Arc<dyn ObjectStorage>,
    audit: AuditTrail,
    settings: InviteSettings,
}

impl std::fmt::Debug for PgInvitesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgInvitesService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// External collaborators the invite workflow talks to.
#[derive(Clone)]
pub struct InviteCollaborators {
    pub mailer: Arc<dyn Mailer>,
    pub storage: Arc<dyn ObjectStorage>,
    pub audit: AuditTrail,
}

impl PgInvitesService {
    #[must_use]
    pub fn new(pool: PgPool, collaborators: InviteCollaborators, settings: InviteSettings) -> Self {
        Self::from_parts(
            Arc::new(PgInvitesRepository::new(pool.clone())),
            Arc::new(PgUsersRepository::new(pool.clone())),
            Arc::new(PgSchoolsRepository::new(pool)),
            collaborators,
            settings,
        )
    }

    /// Build the service from explicit repositories and collaborators.
    #[must_use]
    pub fn from_parts(
        invites: Arc<dyn InvitesRepository>,
        users: Arc<dyn UsersRepository>,
        schools: Arc<dyn SchoolsRepository>,
        collaborators: InviteCollaborators,
        settings: InviteSettings,
    ) -> Self {
        Self {
            invites,
            users,
            schools,
            mailer: collaborators.mailer,
            storage: collaborators.storage,
            audit: collaborators.audit,
            settings,
        }
    }

    /// Load an invite of the actor's school and check it may still be changed by them.
    async fn mutable_invite(
        &self,
        actor: Actor,
        invite: InviteUuid,
    ) -> Result<InviteRecord, InvitesServiceError> {
        let invite = self
            .invites
            .find_invite(actor.school, invite)
            .await?
            .ok_or(InvitesServiceError::NotFound)?;

        // Used invites are immutable for everyone, creator included.
        if invite.used {
            return Err(InvitesServiceError::AlreadyUsed);
        }

        if invite.created_by != actor.user {
            return Err(InvitesServiceError::Forbidden);
        }

        Ok(invite)
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), InvitesServiceError> {
        let taken = self.users.existing_emails(vec![email.to_string()]).await?;

        match taken.into_iter().next() {
            Some(email) => Err(InvitesServiceError::EmailTaken(email)),
            None => Ok(()),
        }
    }

    async fn upload_image(
        &self,
        user: UserUuid,
        image: Option<ProfileImage>,
    ) -> Result<Option<String>, InvitesServiceError> {
        let Some(image) = image else {
            return Ok(None);
        };

        let key = profile_image_key(user, &image);

        let url = self
            .storage
            .upload(StoredObject {
                key,
                content_type: image.content_type,
                bytes: image.bytes,
            })
            .await?;

        Ok(Some(url))
    }

    /// Remove an image uploaded for a redemption that did not complete.
    async fn discard_image(&self, user: UserUuid, image_url: Option<&str>) {
        let Some(image_url) = image_url else {
            return;
        };

        let Some(key) = image_url.find("users/").and_then(|start| image_url.get(start..)) else {
            return;
        };

        if let Err(error) = self.storage.delete(key).await {
            warn!(%user, %error, "failed to delete orphaned profile image");
        }
    }
}

#[async_trait]
impl InvitesService for PgInvitesService {
    async fn issue_invites(
        &self,
        actor: Actor,
        entries: Vec<InviteEntry>,
    ) -> Result<Vec<InviteRecord>, InvitesServiceError> {
        if !actor.role.is_school_admin() {
            return Err(InvitesServiceError::Forbidden);
        }

        if entries.is_empty() {
            return Err(InviteValidationError::EmptyBatch.into());
        }

        let inviter = self
            .users
            .find_user(actor.user)
            .await?
            .ok_or(InvitesServiceError::NotFound)?;

        let school = self
            .schools
            .find_school(actor.school)
            .await?
            .ok_or(InvitesServiceError::NotFound)?;

        let emails = unique_emails(&entries)?;

        if let Some(taken) = self.users.existing_emails(emails).await?.into_iter().next() {
            return Err(InvitesServiceError::EmailTaken(taken));
        }

        let matric_numbers = unique_matric_numbers(&entries)?;

        if !matric_numbers.is_empty()
            && let Some(taken) = self
                .users
                .existing_matric_numbers(actor.school, matric_numbers)
                .await?
                .into_iter()
                .next()
        {
            return Err(InvitesServiceError::MatricNumberTaken(taken));
        }

        let validated = entries
            .iter()
            .map(validate_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let expires_at = Timestamp::now()
            .checked_add(self.settings.ttl)
            .map_err(InvitesServiceError::ExpiryOutOfRange)?;

        let total = validated.len();
        let mut issued = Vec::with_capacity(total);

        for entry in validated {
            let invite = self
                .invites
                .create_invite(NewInvite {
                    uuid: InviteUuid::new(),
                    token: generate_invite_token(),
                    school_uuid: actor.school,
                    created_by: actor.user,
                    email: entry.email,
                    name: entry.name,
                    details: entry.details,
                    expires_at,
                })
                .await?;

            let message = InviteEmail {
                recipient_email: &invite.email,
                recipient_name: &invite.name,
                role: invite.role(),
                inviter_name: &inviter.name,
                school_name: &school.name,
                signup_url: &self.settings.signup_url,
                token: &invite.token,
            }
            .render();

            if let Err(send_error) = self.mailer.send(message).await {
                error!(
                    invite = %invite.uuid,
                    sent = issued.len(),
                    total,
                    error = %send_error,
                    "invite email failed; earlier invites in the batch were already sent"
                );

                return Err(send_error.into());
            }

            self.audit
                .record(
                    NewAuditLog::new(actor.user)
                        .school(actor.school)
                        .action(AuditAction::InviteSent)
                        .details(format!("invited {} as {}", invite.email, invite.role())),
                )
                .await;

            issued.push(invite);
        }

        info!(school = %actor.school, count = issued.len(), "invites issued");

        Ok(issued)
    }

    async fn list_invites(
        &self,
        actor: Actor,
        filter: InviteFilter,
    ) -> Result<Page<InviteRecord, InviteUuid>, InvitesServiceError> {
        if !actor.role.is_school_admin() {
            return Err(InvitesServiceError::Forbidden);
        }

        let size = page_size(filter.limit);

        let rows = self
            .invites
            .list_invites(
                actor.school,
                InviteQuery {
                    matric_number: filter
                        .matric_number
                        .map(|fragment| fragment.trim().to_string())
                        .filter(|fragment| !fragment.is_empty()),
                    created_from: filter.created_from,
                    created_to: filter.created_to,
                    before: filter.before,
                    limit: i64::try_from(size + 1).unwrap_or(i64::MAX),
                },
            )
            .await?;

        Ok(Page::from_overfetch(rows, size, |invite| invite.uuid))
    }

    async fn edit_invite(
        &self,
        actor: Actor,
        invite: InviteUuid,
        edit: InviteEdit,
    ) -> Result<InviteRecord, InvitesServiceError> {
        let current = self.mutable_invite(actor, invite).await?;

        let fields = apply_edit(&current.name, &current.email, &current.details, edit)?;

        if fields.email != current.email {
            self.ensure_email_free(&fields.email).await?;
        }

        if let Some(matric_number) = fields.details.matric_number()
            && current.details.matric_number() != Some(matric_number)
            && let Some(taken) = self
                .users
                .existing_matric_numbers(actor.school, vec![matric_number.to_string()])
                .await?
                .into_iter()
                .next()
        {
            return Err(InvitesServiceError::MatricNumberTaken(taken));
        }

        let updated = self
            .invites
            .update_invite(invite, fields)
            .await?
            .ok_or(InvitesServiceError::AlreadyUsed)?;

        self.audit
            .record(
                NewAuditLog::new(actor.user)
                    .school(actor.school)
                    .action(AuditAction::InviteEdited)
                    .details(format!("edited invite for {}", updated.email)),
            )
            .await;

        Ok(updated)
    }

    async fn delete_invite(
        &self,
        actor: Actor,
        invite: InviteUuid,
    ) -> Result<(), InvitesServiceError> {
        let current = self.mutable_invite(actor, invite).await?;

        if self.invites.delete_invite(invite).await? == 0 {
            return Err(InvitesServiceError::AlreadyUsed);
        }

        self.audit
            .record(
                NewAuditLog::new(actor.user)
                    .school(actor.school)
                    .action(AuditAction::InviteDeleted)
                    .details(format!("deleted invite for {}", current.email)),
            )
            .await;

        Ok(())
    }

    async fn redeem_invite(&self, redemption: Redemption) -> Result<UserRecord, InvitesServiceError> {
        let invite = self
            .invites
            .find_invite_by_token(redemption.token.trim())
            .await?
            .ok_or(InvitesServiceError::NotFound)?;

        if invite.used {
            return Err(InvitesServiceError::AlreadyUsed);
        }

        if invite.is_expired(Timestamp::now()) {
            return Err(InvitesServiceError::Expired);
        }

        validate_password(&redemption.password, &redemption.confirm_password)?;

        if invite.name.trim().is_empty() {
            return Err(InviteValidationError::MissingName.into());
        }

        if let RoleDetails::Student(details) = &invite.details
            && details.class_name.trim().is_empty()
        {
            return Err(InviteValidationError::MissingClassName.into());
        }

        if self.users.find_user_by_email(&invite.email).await?.is_some() {
            return Err(InvitesServiceError::EmailTaken(invite.email));
        }

        let password_hash = hash_password(redemption.password).await?;
        let user_uuid = UserUuid::new();
        let image_url = self.upload_image(user_uuid, redemption.image).await?;

        let new_user = NewUser {
            uuid: user_uuid,
            school_uuid: invite.school_uuid,
            name: invite.name.clone(),
            email: invite.email.clone(),
            password_hash,
            details: invite.details.clone(),
            verified: true,
            image_url: image_url.clone(),
        };

        let user = match self.invites.redeem_invite(invite.uuid, new_user).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.discard_image(user_uuid, image_url.as_deref()).await;

                return Err(InvitesServiceError::AlreadyUsed);
            }
            Err(redeem_error) => {
                self.discard_image(user_uuid, image_url.as_deref()).await;

                if let Some(violation) = redeem_error
                    .as_database_error()
                    .filter(|database_error| {
                        matches!(database_error.kind(), ErrorKind::UniqueViolation)
                    })
                {
                    if violation.constraint() == Some(MATRIC_NUMBER_CONSTRAINT) {
                        return Err(InvitesServiceError::MatricNumberTaken(
                            invite
                                .details
                                .matric_number()
                                .map(str::to_string)
                                .unwrap_or_default(),
                        ));
                    }

                    return Err(InvitesServiceError::EmailTaken(invite.email));
                }

                return Err(redeem_error.into());
            }
        };

        self.audit
            .record(
                NewAuditLog::new(user.uuid)
                    .school(user.school_uuid)
                    .action(AuditAction::InviteRedeemed)
                    .details(format!("{} joined as {}", user.email, user.role())),
            )
            .await;

        info!(user = %user.uuid, invite = %invite.uuid, "invite redeemed");

        Ok(user)
    }
}

/// Bulk invites, invite management and redemption.
#[automock]
#[async_trait]
pub trait InvitesService: Send + Sync {
    /// Validate the whole batch, then persist, email and log each invite in turn.
    ///
    /// Not atomic across entries: when a later entry fails, earlier invites stay
    /// persisted and sent.
    async fn issue_invites(
        &self,
        actor: Actor,
        entries: Vec<InviteEntry>,
    ) -> Result<Vec<InviteRecord>, InvitesServiceError>;

    /// Invites of the actor's school, newest first.
    async fn list_invites(
        &self,
        actor: Actor,
        filter: InviteFilter,
    ) -> Result<Page<InviteRecord, InviteUuid>, InvitesServiceError>;

    /// Change an unused invite. Only its creator may do so.
    async fn edit_invite(
        &self,
        actor: Actor,
        invite: InviteUuid,
        edit: InviteEdit,
    ) -> Result<InviteRecord, InvitesServiceError>;

    /// Remove an unused invite. Only its creator may do so.
    async fn delete_invite(&self, actor: Actor, invite: InviteUuid)
    -> Result<(), InvitesServiceError>;

    /// Exchange an invite token and a chosen password for an activated account.
    async fn redeem_invite(&self, redemption: Redemption)
    -> Result<UserRecord, InvitesServiceError>;
}

fn generate_invite_token() -> String {
    let mut bytes = [0_u8; INVITE_TOKEN_BYTES];

    OsRng.fill_bytes(&mut bytes);

    hex::encode(&bytes)
}

fn profile_image_key(user: UserUuid, image: &ProfileImage) -> String {
    let extension = image
        .file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .filter(|extension| {
            !extension.is_empty()
                && extension.len() <= 5
                && extension.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| "bin".to_string());

    format!("users/{}/avatar.{extension}", user.into_uuid().simple())
}
