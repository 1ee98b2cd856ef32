//! Subscriptions service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use crate::{
    domain::{
        schools::{PgSchoolsRepository, SchoolsRepository, records::SchoolUuid},
        subscriptions::{
            errors::SubscriptionsServiceError,
            records::{NewPlan, NewTransaction, PaymentType, PlanRecord, TransactionUuid},
            repositories::{
                PgPlansRepository, PgTransactionsRepository, PlansRepository,
                TransactionsRepository,
            },
            webhook::{CHARGE_SUCCESS_EVENT, ChargeData, WebhookEvent},
        },
        users::{
            PgUsersRepository, UsersRepository,
            records::{Actor, UserUuid, normalize_email},
        },
    },
    integrations::{CheckoutMetadata, CheckoutRequest, PaymentGateway, WebhookSigner},
};

/// Paid window used when a charge arrives for a payment type without a price.
pub const FALLBACK_SUBSCRIPTION_PERIOD: SignedDuration = SignedDuration::from_hours(365 * 24);

/// Result of a payment initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInitiation {
    /// The school's paid window is still open; the gateway was not called.
    AlreadyPaid,

    /// A hosted checkout the payer should be redirected to.
    Checkout {
        authorization_url: String,
        reference: String,
    },
}

/// What a verified webhook delivery did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Not a settled charge, or not a payload we understand.
    Ignored,

    Recorded {
        reference: String,

        /// School marked paid, when the charge named one and the update succeeded.
        school: Option<SchoolUuid>,
    },
}

/// Plans, checkout and payment webhooks over Postgres.
#[derive(Clone)]
pub struct PgSubscriptionsService {
    schools: Arc<dyn SchoolsRepository>,
    users: Arc<dyn UsersRepository>,
    plans: Arc<dyn PlansRepository>,
    transactions: Arc<dyn TransactionsRepository>,
    gateway: Arc<dyn PaymentGateway>,
    signer: WebhookSigner,
}

impl std::fmt::Debug for PgSubscriptionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSubscriptionsService")
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl PgSubscriptionsService {
    #[must_use]
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>, signer: WebhookSigner) -> Self {
        Self::from_parts(
            Arc::new(PgSchoolsRepository::new(pool.clone())),
            Arc::new(PgUsersRepository::new(pool.clone())),
            Arc::new(PgPlansRepository::new(pool.clone())),
            Arc::new(PgTransactionsRepository::new(pool)),
            gateway,
            signer,
        )
    }

    /// Build the service from explicit repositories.
    #[must_use]
    pub fn from_parts(
        schools: Arc<dyn SchoolsRepository>,
        users: Arc<dyn UsersRepository>,
        plans: Arc<dyn PlansRepository>,
        transactions: Arc<dyn TransactionsRepository>,
        gateway: Arc<dyn PaymentGateway>,
        signer: WebhookSigner,
    ) -> Self {
        Self {
            schools,
            users,
            plans,
            transactions,
            gateway,
            signer,
        }
    }

    /// Mark the charged school paid. Failures are logged, never returned.
    async fn activate_school(
        &self,
        reference: &str,
        metadata: &CheckoutMetadata,
        paid_at: Timestamp,
    ) -> Option<SchoolUuid> {
        let Ok(school) = metadata.school_id.parse::<SchoolUuid>() else {
            error!(
                %reference,
                school_id = %metadata.school_id,
                "charge names an unparseable school"
            );

            return None;
        };

        let period = self.subscription_period(&metadata.payment_type).await;

        let Ok(expires_at) = paid_at.checked_add(period) else {
            error!(%reference, %school, "subscription expiry out of range");

            return None;
        };

        match self.schools.mark_school_paid(school, paid_at, expires_at).await {
            Ok(0) => {
                error!(%reference, %school, "charge names an unknown school");

                None
            }
            Ok(_) => {
                info!(%reference, %school, %expires_at, "school subscription activated");

                Some(school)
            }
            Err(update_error) => {
                error!(
                    %reference,
                    %school,
                    error = %update_error,
                    "failed to mark school paid"
                );

                None
            }
        }
    }

    async fn subscription_period(&self, payment_type: &str) -> SignedDuration {
        let plan = match payment_type.parse::<PaymentType>() {
            Ok(payment_type) => self.plans.find_plan(payment_type).await,
            Err(_unsupported) => Ok(None),
        };

        match plan {
            Ok(Some(plan)) => plan.period(),
            Ok(None) => {
                warn!(%payment_type, "no plan for charged payment type; using fallback period");

                FALLBACK_SUBSCRIPTION_PERIOD
            }
            Err(lookup_error) => {
                warn!(
                    %payment_type,
                    error = %lookup_error,
                    "plan lookup failed; using fallback period"
                );

                FALLBACK_SUBSCRIPTION_PERIOD
            }
        }
    }
}

#[async_trait]
impl SubscriptionsService for PgSubscriptionsService {
    async fn initiate_payment(
        &self,
        actor: Actor,
        payment_type: &str,
        email: Option<String>,
    ) -> Result<PaymentInitiation, SubscriptionsServiceError> {
        let user = self
            .users
            .find_user(actor.user)
            .await?
            .ok_or(SubscriptionsServiceError::NotFound)?;

        let school = self
            .schools
            .find_school(user.school_uuid)
            .await?
            .ok_or(SubscriptionsServiceError::NotFound)?;

        if school.paid {
            debug!(school = %school.uuid, "payment initiation blocked; school already paid");

            return Ok(PaymentInitiation::AlreadyPaid);
        }

        let payment_type = payment_type.parse::<PaymentType>()?;

        let plan = self
            .plans
            .find_plan(payment_type)
            .await?
            .ok_or_else(|| SubscriptionsServiceError::PlanNotFound(payment_type.to_string()))?;

        let email = email
            .map(|email| normalize_email(&email))
            .filter(|email| !email.is_empty())
            .unwrap_or(user.email);

        let checkout = self
            .gateway
            .initialize_checkout(CheckoutRequest {
                email,
                amount: plan.amount,
                currency: plan.currency,
                metadata: CheckoutMetadata {
                    user_id: user.uuid.to_string(),
                    school_id: school.uuid.to_string(),
                    payment_type: payment_type.to_string(),
                },
            })
            .await?;

        info!(school = %school.uuid, reference = %checkout.reference, "checkout initialized");

        Ok(PaymentInitiation::Checkout {
            authorization_url: checkout.authorization_url,
            reference: checkout.reference,
        })
    }

    async fn handle_webhook(
        &self,
        body: &[u8],
        signature: &str,
    ) -> Result<WebhookOutcome, SubscriptionsServiceError> {
        if !self.signer.verify(body, signature) {
            warn!("rejected webhook with an invalid signature");

            return Err(SubscriptionsServiceError::InvalidSignature);
        }

        let event: WebhookEvent = match serde_json::from_slice(body) {
            Ok(event) => event,
            Err(parse_error) => {
                warn!(error = %parse_error, "ignoring signed webhook with an unreadable body");

                return Ok(WebhookOutcome::Ignored);
            }
        };

        let (CHARGE_SUCCESS_EVENT, Some(charge)) = (event.event.as_str(), event.data) else {
            debug!(event = %event.event, "ignoring webhook event");

            return Ok(WebhookOutcome::Ignored);
        };

        let metadata = charge.checkout_metadata();
        let paid_at = charge.paid_at().unwrap_or_else(Timestamp::now);

        let transaction = self
            .transactions
            .upsert_transaction(new_transaction(&charge, metadata.as_ref(), paid_at))
            .await?;

        let school = match &metadata {
            Some(metadata) => {
                self.activate_school(&transaction.reference, metadata, paid_at)
                    .await
            }
            None => {
                warn!(reference = %transaction.reference, "charge carries no checkout metadata");

                None
            }
        };

        Ok(WebhookOutcome::Recorded {
            reference: transaction.reference,
            school,
        })
    }

    async fn expire_subscriptions(&self, now: Timestamp) -> Result<u64, SubscriptionsServiceError> {
        let expired = self.schools.expire_subscriptions(now).await?;

        info!(expired, "subscription expiry sweep finished");

        Ok(expired)
    }

    async fn set_plan(&self, plan: NewPlan) -> Result<PlanRecord, SubscriptionsServiceError> {
        let record = self.plans.upsert_plan(plan.validated()?).await?;

        info!(payment_type = %record.payment_type, amount = record.amount, "plan updated");

        Ok(record)
    }

    async fn list_plans(&self) -> Result<Vec<PlanRecord>, SubscriptionsServiceError> {
        Ok(self.plans.list_plans().await?)
    }
}

/// Plan management, checkout, webhooks and the expiry sweep.
#[automock]
#[async_trait]
pub trait SubscriptionsService: Send + Sync {
    /// Start a hosted checkout for the actor's school unless it is already paid.
    async fn initiate_payment(
        &self,
        actor: Actor,
        payment_type: &str,
        email: Option<String>,
    ) -> Result<PaymentInitiation, SubscriptionsServiceError>;

    /// Verify and apply a gateway webhook delivered with `signature`.
    ///
    /// Only a bad signature or a failed transaction write is an error; a school
    /// that cannot be updated is logged and the delivery still succeeds.
    async fn handle_webhook(
        &self,
        body: &[u8],
        signature: &str,
    ) -> Result<WebhookOutcome, SubscriptionsServiceError>;

    /// Flip every school whose paid window has closed to unpaid.
    async fn expire_subscriptions(&self, now: Timestamp) -> Result<u64, SubscriptionsServiceError>;

    async fn set_plan(&self, plan: NewPlan) -> Result<PlanRecord, SubscriptionsServiceError>;

    async fn list_plans(&self) -> Result<Vec<PlanRecord>, SubscriptionsServiceError>;
}

fn new_transaction(
    charge: &ChargeData,
    metadata: Option<&CheckoutMetadata>,
    paid_at: Timestamp,
) -> NewTransaction {
    NewTransaction {
        uuid: TransactionUuid::new(),
        reference: charge.reference.clone(),
        school_uuid: metadata.and_then(|metadata| metadata.school_id.parse().ok()),
        user_uuid: metadata.and_then(|metadata| metadata.user_id.parse::<UserUuid>().ok()),
        payment_type: metadata.map(|metadata| metadata.payment_type.clone()),
        email: charge
            .customer
            .as_ref()
            .and_then(|customer| customer.email.clone()),
        amount: charge.amount,
        currency: charge.currency.clone(),
        status: charge.status.clone(),
        metadata: charge.metadata.to_string(),
        paid_at: Some(paid_at),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use serde_json::json;
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{
            schools::MockSchoolsRepository,
            subscriptions::{
                errors::PlanValidationError,
                records::TransactionRecord,
                repositories::{MockPlansRepository, MockTransactionsRepository},
            },
            users::{MockUsersRepository, records::RoleDetails},
        },
        integrations::{Checkout, MockPaymentGateway, SecretString},
        test::helpers::{school_record, user_record},
    };

    const SECRET: &str = "sk_test_webhook";

    fn signer() -> WebhookSigner {
        WebhookSigner::new(SecretString::new(SECRET))
    }

    fn plan(period_days: i32) -> PlanRecord {
        PlanRecord {
            payment_type: PaymentType::Subscription,
            amount: 5_000_000,
            currency: "NGN".to_string(),
            period_days,
            updated_at: Timestamp::now(),
        }
    }

    struct Harness {
        schools: MockSchoolsRepository,
        users: MockUsersRepository,
        plans: MockPlansRepository,
        transactions: MockTransactionsRepository,
        gateway: MockPaymentGateway,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                schools: MockSchoolsRepository::new(),
                users: MockUsersRepository::new(),
                plans: MockPlansRepository::new(),
                transactions: MockTransactionsRepository::new(),
                gateway: MockPaymentGateway::new(),
            }
        }

        fn service(self) -> PgSubscriptionsService {
            PgSubscriptionsService::from_parts(
                Arc::new(self.schools),
                Arc::new(self.users),
                Arc::new(self.plans),
                Arc::new(self.transactions),
                Arc::new(self.gateway),
                signer(),
            )
        }
    }

    fn charge_body(event: &str, reference: &str, school: SchoolUuid) -> Vec<u8> {
        json!({
            "event": event,
            "data": {
                "reference": reference,
                "amount": 5_000_000,
                "currency": "NGN",
                "status": "success",
                "paid_at": "2025-01-02T10:00:00.000Z",
                "customer": { "email": "ada@x.com" },
                "metadata": {
                    "userId": UserUuid::new().to_string(),
                    "schoolId": school.to_string(),
                    "paymentType": "subscription"
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    fn record_from_new(transaction: &NewTransaction) -> TransactionRecord {
        TransactionRecord {
            uuid: transaction.uuid,
            reference: transaction.reference.clone(),
            school_uuid: transaction.school_uuid,
            user_uuid: transaction.user_uuid,
            payment_type: transaction.payment_type.clone(),
            email: transaction.email.clone(),
            amount: transaction.amount,
            currency: transaction.currency.clone(),
            status: transaction.status.clone(),
            metadata: transaction.metadata.clone(),
            paid_at: transaction.paid_at,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn paid_school_never_reaches_the_gateway() -> TestResult {
        let school = school_record(true);
        let admin = user_record(&school, RoleDetails::Admin);
        let actor = admin.actor();

        let mut harness = Harness::new();
        harness
            .users
            .expect_find_user()
            .returning(move |_| Ok(Some(admin.clone())));
        harness
            .schools
            .expect_find_school()
            .returning(move |_| Ok(Some(school.clone())));
        harness.gateway.expect_initialize_checkout().never();

        let outcome = harness
            .service()
            .initiate_payment(actor, "subscription", None)
            .await?;

        assert_eq!(outcome, PaymentInitiation::AlreadyPaid);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_carries_user_school_and_plan_price() -> TestResult {
        let school = school_record(false);
        let admin = user_record(&school, RoleDetails::Admin);
        let actor = admin.actor();
        let (user_id, school_id) = (admin.uuid.to_string(), school.uuid.to_string());

        let mut harness = Harness::new();
        harness
            .users
            .expect_find_user()
            .returning(move |_| Ok(Some(admin.clone())));
        harness
            .schools
            .expect_find_school()
            .returning(move |_| Ok(Some(school.clone())));
        harness
            .plans
            .expect_find_plan()
            .returning(|_| Ok(Some(plan(365))));
        harness
            .gateway
            .expect_initialize_checkout()
            .withf(move |request| {
                request.amount == 5_000_000
                    && request.email == "billing@school.test"
                    && request.metadata.user_id == user_id
                    && request.metadata.school_id == school_id
                    && request.metadata.payment_type == "subscription"
            })
            .times(1)
            .returning(|_| {
                Ok(Checkout {
                    authorization_url: "https://checkout.test/abc".to_string(),
                    access_code: "abc".to_string(),
                    reference: "ref-1".to_string(),
                })
            });

        let outcome = harness
            .service()
            .initiate_payment(actor, "subscription", Some(" Billing@School.test ".to_string()))
            .await?;

        assert_eq!(
            outcome,
            PaymentInitiation::Checkout {
                authorization_url: "https://checkout.test/abc".to_string(),
                reference: "ref-1".to_string(),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn unsupported_payment_type_and_missing_plan() {
        let school = school_record(false);
        let admin = user_record(&school, RoleDetails::Admin);
        let actor = admin.actor();

        let mut harness = Harness::new();
        harness
            .users
            .expect_find_user()
            .returning(move |_| Ok(Some(admin.clone())));
        harness
            .schools
            .expect_find_school()
            .returning(move |_| Ok(Some(school.clone())));
        harness.plans.expect_find_plan().returning(|_| Ok(None));
        harness.gateway.expect_initialize_checkout().never();

        let service = harness.service();

        let unsupported = service.initiate_payment(actor, "lifetime", None).await;
        let missing = service.initiate_payment(actor, "subscription", None).await;

        assert!(matches!(
            unsupported,
            Err(SubscriptionsServiceError::UnsupportedPaymentType(_))
        ));
        assert!(matches!(missing, Err(SubscriptionsServiceError::PlanNotFound(_))));
    }

    #[tokio::test]
    async fn bad_signature_changes_nothing() {
        let mut harness = Harness::new();
        harness.transactions.expect_upsert_transaction().never();
        harness.schools.expect_mark_school_paid().never();

        let body = charge_body(CHARGE_SUCCESS_EVENT, "ref-1", SchoolUuid::new());
        let forged = WebhookSigner::new(SecretString::new("not-the-secret"))
            .sign(&body)
            .unwrap_or_default();

        let result = harness.service().handle_webhook(&body, &forged).await;

        assert!(matches!(result, Err(SubscriptionsServiceError::InvalidSignature)));
    }

    #[tokio::test]
    async fn other_events_are_acknowledged_and_ignored() -> TestResult {
        let mut harness = Harness::new();
        harness.transactions.expect_upsert_transaction().never();

        let body = charge_body("transfer.success", "ref-1", SchoolUuid::new());
        let signature = signer().sign(&body).unwrap_or_default();

        let outcome = harness.service().handle_webhook(&body, &signature).await?;

        assert_eq!(outcome, WebhookOutcome::Ignored);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_delivery_updates_one_transaction_and_school_stays_paid() -> TestResult {
        let school = SchoolUuid::new();
        let table: Arc<Mutex<HashMap<String, TransactionRecord>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let mut harness = Harness::new();
        let upserts = Arc::clone(&table);

        harness
            .transactions
            .expect_upsert_transaction()
            .times(2)
            .returning(move |transaction| {
                let mut table = upserts.lock().map_err(|_poisoned| sqlx::Error::PoolClosed)?;

                let record = match table.get(&transaction.reference) {
                    Some(existing) => TransactionRecord {
                        status: transaction.status.clone(),
                        metadata: transaction.metadata.clone(),
                        paid_at: transaction.paid_at,
                        updated_at: Timestamp::now(),
                        ..existing.clone()
                    },
                    None => record_from_new(&transaction),
                };

                table.insert(transaction.reference, record.clone());

                Ok(record)
            });

        harness
            .plans
            .expect_find_plan()
            .returning(|_| Ok(Some(plan(30))));

        let expected_paid_at: Timestamp = "2025-01-02T10:00:00Z".parse()?;
        let expected_expiry = expected_paid_at.checked_add(SignedDuration::from_hours(720))?;

        harness
            .schools
            .expect_mark_school_paid()
            .withf(move |uuid, paid_at, expires_at| {
                *uuid == school && *paid_at == expected_paid_at && *expires_at == expected_expiry
            })
            .times(2)
            .returning(|_, _, _| Ok(1));

        let service = harness.service();
        let body = charge_body(CHARGE_SUCCESS_EVENT, "ref-1", school);
        let signature = signer().sign(&body).unwrap_or_default();

        let first = service.handle_webhook(&body, &signature).await?;
        let second = service.handle_webhook(&body, &signature).await?;

        let expected = WebhookOutcome::Recorded {
            reference: "ref-1".to_string(),
            school: Some(school),
        };

        assert_eq!(first, expected);
        assert_eq!(second, expected);
        assert_eq!(table.lock().map(|table| table.len()).unwrap_or_default(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn school_update_failure_is_swallowed() -> TestResult {
        let mut harness = Harness::new();

        harness
            .transactions
            .expect_upsert_transaction()
            .returning(|transaction| Ok(record_from_new(&transaction)));
        harness
            .plans
            .expect_find_plan()
            .returning(|_| Ok(Some(plan(30))));
        harness
            .schools
            .expect_mark_school_paid()
            .returning(|_, _, _| Err(sqlx::Error::PoolTimedOut));

        let body = charge_body(CHARGE_SUCCESS_EVENT, "ref-9", SchoolUuid::new());
        let signature = signer().sign(&body).unwrap_or_default();

        let outcome = harness.service().handle_webhook(&body, &signature).await?;

        assert_eq!(
            outcome,
            WebhookOutcome::Recorded {
                reference: "ref-9".to_string(),
                school: None,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn sweep_reports_flipped_schools() -> TestResult {
        let flipped = Arc::new(Mutex::new(1_u64));
        let counter = Arc::clone(&flipped);

        let mut harness = Harness::new();
        harness
            .schools
            .expect_expire_subscriptions()
            .times(2)
            .returning(move |_| {
                let mut remaining = counter.lock().map_err(|_poisoned| sqlx::Error::PoolClosed)?;
                let expired = *remaining;
                *remaining = 0;

                Ok(expired)
            });

        let service = harness.service();
        let now = Timestamp::now();

        assert_eq!(service.expire_subscriptions(now).await?, 1);
        assert_eq!(service.expire_subscriptions(now).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn plan_validation() -> TestResult {
        let mut harness = Harness::new();
        harness
            .plans
            .expect_upsert_plan()
            .withf(|plan| plan.currency == "NGN")
            .times(1)
            .returning(|plan| {
                Ok(PlanRecord {
                    payment_type: plan.payment_type,
                    amount: plan.amount,
                    currency: plan.currency,
                    period_days: plan.period_days,
                    updated_at: Timestamp::now(),
                })
            });

        let service = harness.service();
        let new_plan = |amount, currency: &str, period_days| NewPlan {
            payment_type: PaymentType::Subscription,
            amount,
            currency: currency.to_string(),
            period_days,
        };

        assert!(matches!(
            service.set_plan(new_plan(0, "NGN", 30)).await,
            Err(SubscriptionsServiceError::InvalidPlan(PlanValidationError::NonPositiveAmount))
        ));
        assert!(matches!(
            service.set_plan(new_plan(100, "NGN", 0)).await,
            Err(SubscriptionsServiceError::InvalidPlan(PlanValidationError::NonPositivePeriod))
        ));
        assert!(matches!(
            service.set_plan(new_plan(100, "naira", 30)).await,
            Err(SubscriptionsServiceError::InvalidPlan(PlanValidationError::InvalidCurrency(_)))
        ));

        let plan = service.set_plan(new_plan(100, " ngn ", 30)).await?;

        assert_eq!(plan.currency, "NGN");

        Ok(())
    }
}
