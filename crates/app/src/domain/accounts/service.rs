//! Accounts service: school sign-up and email verification.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rand::{Rng, rngs::OsRng};
use sha2::{Digest, Sha256};
use sqlx::{
    PgPool,
    error::{DatabaseError, ErrorKind},
};
use tracing::{info, warn};

use crate::{
    auth::{MIN_PASSWORD_LENGTH, hash_password},
    domain::{
        academic::AcademicSession,
        accounts::{
            data::{RegisteredSchool, SchoolRegistration},
            errors::{AccountValidationError, AccountsServiceError},
            records::NewOtp,
            repository::{OtpsRepository, PgOtpsRepository},
        },
        audit::{
            AuditTrail,
            records::{AuditAction, NewAuditLog},
        },
        schools::{
            PgSchoolsRepository, SchoolsRepository,
            records::{NewSchool, SchoolUuid, generate_school_code},
        },
        users::{
            PgUsersRepository, UsersRepository,
            data::NewUser,
            records::{RoleDetails, UserRecord, UserUuid, is_plausible_email, normalize_email},
        },
    },
    hex,
    integrations::{EmailMessage, Mailer},
};

/// How long a verification code stays valid.
pub const OTP_TTL: SignedDuration = SignedDuration::from_mins(5);

const OTP_DIGITS: usize = 6;
const OTP_UPPER_BOUND: u32 = 1_000_000;

/// School registration and account management over Postgres.
#[derive(Clone)]
pub struct PgAccountsService {
    users: Arc<dyn UsersRepository>,
    schools: Arc<dyn SchoolsRepository>,
    otps: Arc<dyn OtpsRepository>,
    mailer: Arc<dyn Mailer>,
    audit: AuditTrail,
}

impl std::fmt::Debug for PgAccountsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAccountsService").finish_non_exhaustive()
    }
}

impl PgAccountsService {
    #[must_use]
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, audit: AuditTrail) -> Self {
        Self::from_parts(
            Arc::new(PgUsersRepository::new(pool.clone())),
            Arc::new(PgSchoolsRepository::new(pool.clone())),
            Arc::new(PgOtpsRepository::new(pool)),
            mailer,
            audit,
        )
    }

    /// Build the service from explicit repositories.
    #[must_use]
    pub fn from_parts(
        users: Arc<dyn UsersRepository>,
        schools: Arc<dyn SchoolsRepository>,
        otps: Arc<dyn OtpsRepository>,
        mailer: Arc<dyn Mailer>,
        audit: AuditTrail,
    ) -> Self {
        Self {
            users,
            schools,
            otps,
            mailer,
            audit,
        }
    }
}

#[async_trait]
impl AccountsService for PgAccountsService {
    async fn register_school(
        &self,
        registration: SchoolRegistration,
    ) -> Result<RegisteredSchool, AccountsServiceError> {
        let school_name = registration.school_name.trim().to_string();

        if school_name.is_empty() {
            return Err(AccountValidationError::MissingSchoolName.into());
        }

        let admin_name = registration.admin_name.trim().to_string();

        if admin_name.is_empty() {
            return Err(AccountValidationError::MissingName.into());
        }

        let email = normalize_email(&registration.email);

        if !is_plausible_email(&email) {
            return Err(AccountValidationError::InvalidEmail(email).into());
        }

        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH).into());
        }

        let current_session = registration
            .current_session
            .as_deref()
            .map(str::trim)
            .filter(|session| !session.is_empty())
            .map(|session| {
                session.parse::<AcademicSession>().map_err(|_error| {
                    AccountValidationError::InvalidSession(session.to_string())
                })
            })
            .transpose()?;

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AccountsServiceError::EmailTaken(email));
        }

        let password_hash = hash_password(registration.password).await?;
        let school_uuid = SchoolUuid::new();

        let school = NewSchool {
            uuid: school_uuid,
            code: generate_school_code(),
            name: school_name,
            address: registration.address.trim().to_string(),
            current_session,
        };

        let admin = NewUser {
            uuid: UserUuid::new(),
            school_uuid,
            name: admin_name,
            email: email.clone(),
            password_hash,
            details: RoleDetails::Admin,
            verified: false,
            image_url: None,
        };

        let (school, admin) = match self.schools.register_school(school, admin).await {
            Ok(created) => created,
            Err(register_error) => {
                let unique_violation = register_error
                    .as_database_error()
                    .map(DatabaseError::kind)
                    .is_some_and(|kind| matches!(kind, ErrorKind::UniqueViolation));

                if unique_violation {
                    return Err(AccountsServiceError::EmailTaken(email));
                }

                return Err(register_error.into());
            }
        };

        self.audit
            .record(
                NewAuditLog::new(admin.uuid)
                    .school(school.uuid)
                    .action(AuditAction::SchoolRegistered)
                    .details(format!("{} registered {}", admin.email, school.code)),
            )
            .await;

        info!(school = %school.uuid, code = %school.code, "school registered");

        let otp_sent = match self.send_otp(&admin.email).await {
            Ok(()) => true,
            Err(send_error) => {
                warn!(
                    school = %school.uuid,
                    error = %send_error,
                    "failed to send sign-up verification code"
                );

                false
            }
        };

        Ok(RegisteredSchool {
            school,
            admin,
            otp_sent,
        })
    }

    async fn send_otp(&self, email: &str) -> Result<(), AccountsServiceError> {
        let email = normalize_email(email);

        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(AccountsServiceError::NotFound)?;

        let code = generate_otp_code();
        let expires_at = Timestamp::now()
            .checked_add(OTP_TTL)
            .map_err(AccountsServiceError::ExpiryOutOfRange)?;

        self.otps
            .replace_otp(NewOtp {
                email: email.clone(),
                code_hash: hash_otp_code(&email, &code),
                expires_at,
            })
            .await?;

        self.mailer.send(otp_email(&email, &user.name, &code)).await?;

        Ok(())
    }

    async fn verify_otp(&self, email: &str, code: &str) -> Result<(), AccountsServiceError> {
        let email = normalize_email(email);
        let now = Timestamp::now();

        let otp = self
            .otps
            .find_otp(&email)
            .await?
            .ok_or(AccountValidationError::InvalidCode)?;

        if otp.is_expired(now) {
            return Err(AccountValidationError::ExpiredCode.into());
        }

        let code_hash = hash_otp_code(&email, code.trim());

        if code_hash != otp.code_hash {
            return Err(AccountValidationError::InvalidCode.into());
        }

        // A newer code may have replaced this one since it was read.
        if !self.otps.consume_otp(&email, &code_hash, now).await? {
            return Err(AccountValidationError::InvalidCode.into());
        }

        info!(%email, "email verified");

        Ok(())
    }

    async fn current_user(&self, user: UserUuid) -> Result<UserRecord, AccountsServiceError> {
        self.users
            .find_user(user)
            .await?
            .ok_or(AccountsServiceError::NotFound)
    }
}

/// School registration, verification, password reset and profile updates.
#[automock]
#[async_trait]
pub trait AccountsService: Send + Sync {
    /// Create an unpaid school with an unverified admin, then email the admin a code.
    async fn register_school(
        &self,
        registration: SchoolRegistration,
    ) -> Result<RegisteredSchool, AccountsServiceError>;

    /// Issue a fresh verification code, invalidating any earlier one.
    async fn send_otp(&self, email: &str) -> Result<(), AccountsServiceError>;

    /// Consume a live code and mark its user verified.
    async fn verify_otp(&self, email: &str, code: &str) -> Result<(), AccountsServiceError>;

    async fn current_user(&self, user: UserUuid) -> Result<UserRecord, AccountsServiceError>;
}

fn generate_otp_code() -> String {
    let code = OsRng.gen_range(0..OTP_UPPER_BOUND);

    format!("{code:0width$}", width = OTP_DIGITS)
}

/// Codes are bound to their email so equal codes of two users hash differently.
fn hash_otp_code(email: &str, code: &str) -> String {
    let mut hasher = Sha256::new();

    hasher.update(email.as_bytes());
    hasher.update([0]);
    hasher.update(code.as_bytes());

    hex::encode(&hasher.finalize())
}

fn otp_email(email: &str, name: &str, code: &str) -> EmailMessage {
    let minutes = OTP_TTL.as_mins();

    EmailMessage {
        to: email.to_string(),
        subject: "Your ScholarLink verification code".to_string(),
        html: format!(
            "<p>Hello {},</p><p>Your verification code is <strong>{code}</strong>. \
             It expires in {minutes} minutes.</p>",
            name.replace('<', "&lt;").replace('>', "&gt;"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{
            accounts::{records::OtpRecord, repository::MockOtpsRepository},
            audit::MockAuditLogsRepository,
            schools::MockSchoolsRepository,
            users::MockUsersRepository,
        },
        integrations::MockMailer,
        test::helpers::{school_record, user_record},
    };

    type OtpTable = Arc<Mutex<HashMap<String, OtpRecord>>>;

    /// OTP repository mock backed by an in-memory table.
    fn otp_table() -> (MockOtpsRepository, OtpTable) {
        let table: OtpTable = Arc::new(Mutex::new(HashMap::new()));
        let mut otps = MockOtpsRepository::new();

        let replace_table = Arc::clone(&table);

        otps.expect_replace_otp().returning(move |otp| {
            let record = OtpRecord {
                email: otp.email.clone(),
                code_hash: otp.code_hash,
                expires_at: otp.expires_at,
                created_at: Timestamp::now(),
            };

            if let Ok(mut table) = replace_table.lock() {
                table.insert(otp.email, record.clone());
            }

            Ok(record)
        });

        let find_table = Arc::clone(&table);

        otps.expect_find_otp().returning(move |email| {
            Ok(find_table
                .lock()
                .ok()
                .and_then(|table| table.get(email).cloned()))
        });

        let consume_table = Arc::clone(&table);

        otps.expect_consume_otp().returning(move |email, code_hash, now| {
            let Ok(mut table) = consume_table.lock() else {
                return Ok(false);
            };

            let live = table
                .get(email)
                .is_some_and(|otp| otp.code_hash == code_hash && !otp.is_expired(now));

            if live {
                table.remove(email);
            }

            Ok(live)
        });

        (otps, table)
    }

    /// Mailer mock collecting the codes it was asked to send.
    fn code_outbox() -> (MockMailer, Arc<Mutex<Vec<String>>>) {
        let codes = Arc::new(Mutex::new(Vec::new()));
        let outbox = Arc::clone(&codes);
        let mut mailer = MockMailer::new();

        mailer.expect_send().returning(move |message| {
            let code = message
                .html
                .split("<strong>")
                .nth(1)
                .and_then(|rest| rest.split("</strong>").next())
                .unwrap_or_default()
                .to_string();

            if let Ok(mut outbox) = outbox.lock() {
                outbox.push(code);
            }

            Ok(())
        });

        (mailer, codes)
    }

    fn known_user() -> MockUsersRepository {
        let school = school_record(false);
        let mut admin = user_record(&school, RoleDetails::Admin);
        admin.email = "admin@school.test".to_string();

        let mut users = MockUsersRepository::new();

        users
            .expect_find_user_by_email()
            .returning(move |_| Ok(Some(admin.clone())));

        users
    }

    fn service(
        users: MockUsersRepository,
        schools: MockSchoolsRepository,
        otps: MockOtpsRepository,
        mailer: MockMailer,
    ) -> PgAccountsService {
        let mut audit = MockAuditLogsRepository::new();
        audit.expect_create_log().returning(|_| Ok(()));

        PgAccountsService::from_parts(
            Arc::new(users),
            Arc::new(schools),
            Arc::new(otps),
            Arc::new(mailer),
            AuditTrail::new(Arc::new(audit)),
        )
    }

    #[test]
    fn otp_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_otp_code();

            assert_eq!(code.len(), OTP_DIGITS, "unexpected code {code}");
            assert!(code.chars().all(|c| c.is_ascii_digit()), "unexpected code {code}");
        }
    }

    #[tokio::test]
    async fn second_code_replaces_the_first() -> TestResult {
        let (otps, table) = otp_table();
        let (mailer, codes) = code_outbox();
        let service = service(known_user(), MockSchoolsRepository::new(), otps, mailer);

        service.send_otp("Admin@School.test").await?;
        service.send_otp("admin@school.test").await?;

        let codes = codes.lock().map(|codes| codes.clone()).unwrap_or_default();

        assert_eq!(codes.len(), 2, "expected two codes to be sent");

        let first = codes.first().cloned().unwrap_or_default();
        let second = codes.get(1).cloned().unwrap_or_default();

        assert_eq!(table.lock().map(|table| table.len()).unwrap_or_default(), 1);

        if first != second {
            let stale = service.verify_otp("admin@school.test", &first).await;

            assert!(
                matches!(
                    stale,
                    Err(AccountsServiceError::Validation(AccountValidationError::InvalidCode))
                ),
                "expected the first code to be rejected, got {stale:?}"
            );
        }

        service.verify_otp("admin@school.test", &second).await?;

        let replayed = service.verify_otp("admin@school.test", &second).await;

        assert!(matches!(
            replayed,
            Err(AccountsServiceError::Validation(AccountValidationError::InvalidCode))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn expired_code_is_rejected() {
        let mut otps = MockOtpsRepository::new();

        otps.expect_find_otp().returning(|email| {
            Ok(Some(OtpRecord {
                email: email.to_string(),
                code_hash: hash_otp_code(email, "123456"),
                expires_at: Timestamp::now() - SignedDuration::from_secs(1),
                created_at: Timestamp::now() - OTP_TTL,
            }))
        });
        otps.expect_consume_otp().never();

        let service = service(
            MockUsersRepository::new(),
            MockSchoolsRepository::new(),
            otps,
            MockMailer::new(),
        );

        let result = service.verify_otp("admin@school.test", "123456").await;

        assert!(matches!(
            result,
            Err(AccountsServiceError::Validation(AccountValidationError::ExpiredCode))
        ));
    }

    #[tokio::test]
    async fn send_otp_to_unknown_email_is_not_found() {
        let mut users = MockUsersRepository::new();
        users.expect_find_user_by_email().returning(|_| Ok(None));

        let mut otps = MockOtpsRepository::new();
        otps.expect_replace_otp().never();

        let service = service(users, MockSchoolsRepository::new(), otps, MockMailer::new());

        let result = service.send_otp("nobody@school.test").await;

        assert!(matches!(result, Err(AccountsServiceError::NotFound)));
    }

    #[tokio::test]
    async fn registration_creates_unpaid_school_and_unverified_admin() -> TestResult {
        let stored_admin: Arc<Mutex<Option<UserRecord>>> = Arc::new(Mutex::new(None));

        let mut users = MockUsersRepository::new();
        let lookup = Arc::clone(&stored_admin);

        users
            .expect_find_user_by_email()
            .returning(move |_| Ok(lookup.lock().ok().and_then(|admin| admin.clone())));

        let mut schools = MockSchoolsRepository::new();
        let created = Arc::clone(&stored_admin);

        schools
            .expect_register_school()
            .withf(|school, admin| {
                school.code.starts_with("SCH-")
                    && admin.details == RoleDetails::Admin
                    && !admin.verified
                    && admin.school_uuid == school.uuid
            })
            .times(1)
            .returning(move |school, admin| {
                let mut record = school_record(false);
                record.uuid = school.uuid;
                record.code = school.code;
                record.name = school.name;

                let mut user = user_record(&record, admin.details);
                user.uuid = admin.uuid;
                user.email = admin.email;
                user.verified = admin.verified;

                if let Ok(mut slot) = created.lock() {
                    *slot = Some(user.clone());
                }

                Ok((record, user))
            });

        let (otps, table) = otp_table();
        let (mailer, codes) = code_outbox();
        let service = service(users, schools, otps, mailer);

        let registered = service
            .register_school(SchoolRegistration {
                school_name: " Green Hills ".to_string(),
                address: "1 Hill Road".to_string(),
                current_session: Some("2024/2025".to_string()),
                admin_name: "Ada".to_string(),
                email: "Ada@GreenHills.test".to_string(),
                password: "secret1".to_string(),
            })
            .await?;

        assert!(!registered.school.paid);
        assert!(!registered.admin.verified);
        assert_eq!(registered.admin.email, "ada@greenhills.test");
        assert!(registered.otp_sent);
        assert!(table.lock().is_ok_and(|table| table.contains_key("ada@greenhills.test")));
        assert_eq!(codes.lock().map(|codes| codes.len()).unwrap_or_default(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn registration_with_taken_email_is_a_conflict() {
        let mut schools = MockSchoolsRepository::new();
        schools.expect_register_school().never();

        let service = service(
            known_user(),
            schools,
            MockOtpsRepository::new(),
            MockMailer::new(),
        );

        let result = service
            .register_school(SchoolRegistration {
                school_name: "Green Hills".to_string(),
                admin_name: "Ada".to_string(),
                email: "admin@school.test".to_string(),
                password: "secret1".to_string(),
                ..SchoolRegistration::default()
            })
            .await;

        assert!(matches!(result, Err(AccountsServiceError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn registration_validates_before_touching_storage() {
        let service = service(
            MockUsersRepository::new(),
            MockSchoolsRepository::new(),
            MockOtpsRepository::new(),
            MockMailer::new(),
        );

        let result = service
            .register_school(SchoolRegistration {
                school_name: "Green Hills".to_string(),
                admin_name: "Ada".to_string(),
                email: "ada@greenhills.test".to_string(),
                password: "short".to_string(),
                ..SchoolRegistration::default()
            })
            .await;

        assert!(matches!(
            result,
            Err(AccountsServiceError::Validation(AccountValidationError::PasswordTooShort(6)))
        ));
    }
}
