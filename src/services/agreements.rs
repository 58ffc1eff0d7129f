use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::DbErr;
use tracing::{error, info, instrument, warn};

use crate::db::AgreementStore;
use crate::error::{AppError, AppResult};
use crate::models::agreements::{
    self, AgreementStatus, AgreementView, Decision, DecisionOutcome, NewAgreement, PartyDetails,
    Verdict,
};
use crate::models::users::{self, Role};
use crate::notify::Notifier;

const NEW_AGREEMENT_SMS: &str = "You have received a new agreement on your profile.";
const ACCEPTED_SMS: &str = "Your agreement has been accepted. The farm is now marked as in use.";
const REJECTED_SMS: &str = "Your agreement has been rejected.";

/// Whether accepting an agreement requires the farmer's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePolicy {
    /// Acceptance without a signature succeeds; `farmer_signature` stays
    /// empty and the agreement is reported as unsigned.
    #[default]
    Optional,
    RequiredForAcceptance,
}

/// The agreement lifecycle: propose, list, decide, delete.
///
/// State changes are committed before any side effect runs. Farm status
/// updates and SMS are best effort: their failures are logged and never
/// change the result of the operation.
#[derive(Clone)]
pub struct AgreementService {
    store: Arc<dyn AgreementStore>,
    notifier: Notifier,
    signature_policy: SignaturePolicy,
}

impl AgreementService {
    pub fn new(
        store: Arc<dyn AgreementStore>,
        notifier: Notifier,
        signature_policy: SignaturePolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            signature_policy,
        }
    }

    /// Record a contractor's proposal as a Pending agreement and tell the farmer.
    #[instrument(
        skip(self, input),
        fields(farm_id = %input.farm_id, farmer_id = input.farmer_id, contractor_id = input.contractor_id)
    )]
    pub async fn propose(&self, input: NewAgreement) -> AppResult<agreements::Model> {
        let farmer = self
            .party(input.farmer_id, Role::Farmer)
            .await?
            .ok_or_else(|| AppError::validation("Invalid farmer ID. Farmer not found."))?;

        self.party(input.contractor_id, Role::Contractor)
            .await?
            .ok_or_else(|| AppError::validation("Invalid contractor ID. Contractor not found."))?;

        let agreement = self
            .store
            .insert_agreement(input)
            .await
            .map_err(infra("insert agreement", None))?;

        info!(agreement_id = agreement.id, "agreement proposed");

        self.notify_best_effort(&farmer, agreement.id, NEW_AGREEMENT_SMS)
            .await;

        Ok(agreement)
    }

    /// Every agreement the user is a party to, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: Option<(u64, u64)>,
    ) -> AppResult<Vec<AgreementView>> {
        let rows = self
            .store
            .agreements_for_user(user_id, page)
            .await
            .map_err(infra("list agreements", None))?;

        let mut party_ids: Vec<i32> = rows
            .iter()
            .flat_map(|a| [a.farmer_id, a.contractor_id])
            .collect();
        party_ids.sort_unstable();
        party_ids.dedup();

        let parties: HashMap<i32, users::Model> = self
            .store
            .find_users(&party_ids)
            .await
            .map_err(infra("load agreement parties", None))?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let details = |id: i32| {
            parties
                .get(&id)
                .map(|user| PartyDetails {
                    name: user.full_name.clone(),
                    contact: user.contact.clone(),
                })
                .unwrap_or_default()
        };

        Ok(rows
            .into_iter()
            .map(|agreement| {
                let farmer = details(agreement.farmer_id);
                let contractor = details(agreement.contractor_id);
                AgreementView::new(agreement, farmer, contractor)
            })
            .collect())
    }

    /// Apply the farmer's accept/reject decision to a Pending agreement.
    ///
    /// The transition is a conditional update on `status = Pending`, so of
    /// two concurrent decisions exactly one commits and the other gets
    /// `Conflict`.
    #[instrument(
        skip(self, decision),
        fields(actor = decision.user_id, verdict = ?decision.verdict)
    )]
    pub async fn decide(&self, agreement_id: i32, decision: Decision) -> AppResult<DecisionOutcome> {
        let agreement = self.load(agreement_id).await?;
        ensure_pending(&agreement)?;

        if agreement.farmer_id != decision.user_id {
            warn!(farmer_id = agreement.farmer_id, "decision attempted by someone other than the farmer");
            return Err(AppError::authorization(
                "Only the farmer can accept or reject the agreement.",
            ));
        }

        let farmer_signature = match decision.verdict {
            Verdict::Accept => match decision.signature {
                Some(signature) => Some(signature),
                None if self.signature_policy == SignaturePolicy::RequiredForAcceptance => {
                    return Err(AppError::validation(
                        "A signature is required to accept the agreement.",
                    ));
                }
                None => None,
            },
            Verdict::Reject => None,
        };

        let new_status = decision.verdict.status();
        let committed = self
            .store
            .resolve_pending(agreement_id, new_status, farmer_signature, chrono::Utc::now())
            .await
            .map_err(infra("resolve agreement", Some(agreement_id)))?;

        if !committed {
            // Another request decided (or deleted) the agreement between our
            // read and our write; report what it did.
            let current = self.load(agreement_id).await?;
            ensure_pending(&current)?;
            return Err(AppError::internal(format!(
                "agreement {agreement_id} is Pending but the conditional update matched no row"
            )));
        }

        info!(%new_status, "agreement decided");

        if new_status == AgreementStatus::Accepted {
            self.mark_farm_in_use(&agreement).await;
        }

        match self.party(agreement.contractor_id, Role::Contractor).await {
            Ok(Some(contractor)) => {
                let body = match decision.verdict {
                    Verdict::Accept => ACCEPTED_SMS,
                    Verdict::Reject => REJECTED_SMS,
                };
                self.notify_best_effort(&contractor, agreement_id, body).await;
            }
            Ok(None) => warn!(
                contractor_id = agreement.contractor_id,
                "contractor not found; skipping sms"
            ),
            // Already logged by `party`.
            Err(_) => {}
        }

        Ok(DecisionOutcome {
            agreement_id,
            new_status,
        })
    }

    /// Hard-delete an agreement regardless of status.
    #[instrument(skip(self))]
    pub async fn delete(&self, agreement_id: i32) -> AppResult<()> {
        let deleted = self
            .store
            .delete_agreement(agreement_id)
            .await
            .map_err(infra("delete agreement", Some(agreement_id)))?;

        if !deleted {
            return Err(AppError::not_found("Agreement not found."));
        }

        info!("agreement deleted");
        Ok(())
    }

    /// Farm tokens that have an accepted agreement.
    pub async fn active_farm_ids(&self) -> AppResult<Vec<String>> {
        self.store
            .active_farm_ids()
            .await
            .map_err(infra("list active farms", None))
    }

    async fn load(&self, agreement_id: i32) -> AppResult<agreements::Model> {
        self.store
            .find_agreement(agreement_id)
            .await
            .map_err(infra("load agreement", Some(agreement_id)))?
            .ok_or_else(|| AppError::not_found("Agreement not found."))
    }

    /// The user with `id`, if they exist and hold `role`.
    async fn party(&self, id: i32, role: Role) -> AppResult<Option<users::Model>> {
        let user = self
            .store
            .find_user(id)
            .await
            .map_err(infra("load user", None))?;
        Ok(user.filter(|user| user.is(role)))
    }

    async fn mark_farm_in_use(&self, agreement: &agreements::Model) {
        match self.store.mark_farm_in_use(&agreement.farm_id).await {
            Ok(0) => warn!(farm_id = %agreement.farm_id, "accepted agreement references no farm"),
            Ok(_) => info!(farm_id = %agreement.farm_id, "farm marked in use"),
            Err(e) => error!(
                farm_id = %agreement.farm_id,
                agreement_id = agreement.id,
                error = %e,
                "failed to mark farm in use"
            ),
        }
    }

    async fn notify_best_effort(&self, recipient: &users::Model, agreement_id: i32, body: &str) {
        if let Err(e) = self.notifier.notify(&recipient.contact, body).await {
            warn!(
                agreement_id,
                recipient_id = recipient.id,
                error = %e,
                "sms notification failed"
            );
        }
    }
}

fn ensure_pending(agreement: &agreements::Model) -> AppResult<()> {
    if agreement.status.is_terminal() {
        return Err(AppError::conflict(format!(
            "Agreement already {}.",
            agreement.status.as_str().to_lowercase()
        )));
    }
    Ok(())
}

/// Log a persistence failure with its context and turn it into an `AppError`.
fn infra(operation: &'static str, agreement_id: Option<i32>) -> impl FnOnce(DbErr) -> AppError {
    move |e| {
        error!(operation, ?agreement_id, error = %e, "persistence failure");
        AppError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MockAgreementStore;
    use crate::models::agreements::AgreementKind;
    use crate::notify::{DeliveryReceipt, MockSmsGateway, NotifyError};
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn user(id: i32, role: Role, contact: &str) -> users::Model {
        users::Model {
            id,
            full_name: format!("User {id}"),
            user_name: format!("user{id}"),
            password: "hash".to_string(),
            contact: contact.to_string(),
            user_type: role,
            aadhar: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn agreement(id: i32, status: AgreementStatus) -> agreements::Model {
        agreements::Model {
            id,
            farm_id: "farm-token".to_string(),
            farmer_id: 10,
            contractor_id: 20,
            status,
            amount: 5000.0,
            contract_details: Some("details".to_string()),
            terms: "[\"t1\"]".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            agreement_type: Some(AgreementKind::ProfitSharing),
            profit_share: Some(40.0),
            sale_price: None,
            payment_method: None,
            crop_type: None,
            penalty_clause: None,
            renewal_option: None,
            contractor_signature: Some("data:image/png;base64,QQ==".to_string()),
            farmer_signature: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn proposal() -> NewAgreement {
        NewAgreement {
            farm_id: "farm-token".to_string(),
            farmer_id: 10,
            contractor_id: 20,
            amount: 5000.0,
            terms: vec!["t1".to_string()],
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            contract_details: Some("details".to_string()),
            kind: None,
            profit_share: None,
            sale_price: None,
            payment_method: None,
            crop_type: None,
            penalty_clause: None,
            renewal_option: None,
            contractor_signature: None,
        }
    }

    fn failing_gateway() -> MockSmsGateway {
        let mut gateway = MockSmsGateway::new();
        gateway.expect_send().returning(|_, _| {
            Err(NotifyError::Rejected {
                status: 400,
                detail: "unverified number".to_string(),
            })
        });
        gateway
    }

    fn service(store: MockAgreementStore, gateway: MockSmsGateway) -> AgreementService {
        AgreementService::new(
            Arc::new(store),
            Notifier::new(Arc::new(gateway)),
            SignaturePolicy::Optional,
        )
    }

    fn accept(user_id: i32, signature: Option<&str>) -> Decision {
        Decision {
            verdict: Verdict::Accept,
            user_id,
            signature: signature.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn proposal_succeeds_when_sms_fails() {
        let mut store = MockAgreementStore::new();
        store.expect_find_user().with(eq(10)).returning(|id| Ok(Some(user(id, Role::Farmer, "9876543210"))));
        store.expect_find_user().with(eq(20)).returning(|id| Ok(Some(user(id, Role::Contractor, "9123456780"))));
        store
            .expect_insert_agreement()
            .times(1)
            .returning(|_| Ok(agreement(1, AgreementStatus::Pending)));

        let created = service(store, failing_gateway()).propose(proposal()).await.unwrap();
        assert_eq!(created.status, AgreementStatus::Pending);
    }

    #[tokio::test]
    async fn proposal_with_swapped_roles_is_rejected_before_insert() {
        let mut store = MockAgreementStore::new();
        store.expect_find_user().with(eq(10)).returning(|id| Ok(Some(user(id, Role::Contractor, "9876543210"))));
        store.expect_insert_agreement().never();

        let mut gateway = MockSmsGateway::new();
        gateway.expect_send().never();

        let err = service(store, gateway).propose(proposal()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("farmer")));
    }

    #[tokio::test]
    async fn unknown_contractor_is_a_validation_error() {
        let mut store = MockAgreementStore::new();
        store.expect_find_user().with(eq(10)).returning(|id| Ok(Some(user(id, Role::Farmer, "9876543210"))));
        store.expect_find_user().with(eq(20)).returning(|_| Ok(None));
        store.expect_insert_agreement().never();

        let err = service(store, MockSmsGateway::new()).propose(proposal()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("contractor")));
    }

    #[tokio::test]
    async fn deciding_a_resolved_agreement_is_a_conflict() {
        let mut store = MockAgreementStore::new();
        store
            .expect_find_agreement()
            .returning(|id| Ok(Some(agreement(id, AgreementStatus::Accepted))));
        store.expect_resolve_pending().never();

        let err = service(store, MockSmsGateway::new())
            .decide(1, Decision { verdict: Verdict::Reject, user_id: 10, signature: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Agreement already accepted."));
    }

    #[tokio::test]
    async fn only_the_farmer_may_decide() {
        let mut store = MockAgreementStore::new();
        store
            .expect_find_agreement()
            .returning(|id| Ok(Some(agreement(id, AgreementStatus::Pending))));
        store.expect_resolve_pending().never();

        let err = service(store, MockSmsGateway::new())
            .decide(1, accept(20, Some("sig")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn missing_agreement_is_not_found() {
        let mut store = MockAgreementStore::new();
        store.expect_find_agreement().returning(|_| Ok(None));

        let err = service(store, MockSmsGateway::new())
            .decide(99, accept(10, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn acceptance_survives_farm_update_and_sms_failures() {
        let mut store = MockAgreementStore::new();
        store
            .expect_find_agreement()
            .returning(|id| Ok(Some(agreement(id, AgreementStatus::Pending))));
        store
            .expect_resolve_pending()
            .withf(|id, status, signature, _| {
                *id == 1 && *status == AgreementStatus::Accepted && signature.as_deref() == Some("sig")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(true));
        store
            .expect_mark_farm_in_use()
            .withf(|farm_id| farm_id.to_string() == "farm-token")
            .times(1)
            .returning(|_| Err(DbErr::Custom("farm table locked".to_string())));
        store
            .expect_find_user()
            .returning(|id| Ok(Some(user(id, Role::Contractor, "9123456780"))));

        let outcome = service(store, failing_gateway())
            .decide(1, accept(10, Some("sig")))
            .await
            .unwrap();
        assert_eq!(outcome.new_status, AgreementStatus::Accepted);
    }

    #[tokio::test]
    async fn rejection_does_not_touch_the_farm_or_store_a_signature() {
        let mut store = MockAgreementStore::new();
        store
            .expect_find_agreement()
            .returning(|id| Ok(Some(agreement(id, AgreementStatus::Pending))));
        store
            .expect_resolve_pending()
            .withf(|_, status, signature, _| *status == AgreementStatus::Rejected && signature.is_none())
            .returning(|_, _, _, _| Ok(true));
        store.expect_mark_farm_in_use().never();
        store
            .expect_find_user()
            .returning(|id| Ok(Some(user(id, Role::Contractor, "9123456780"))));

        let mut gateway = MockSmsGateway::new();
        gateway
            .expect_send()
            .withf(|to, body| to.as_str() == "+919123456780" && body == REJECTED_SMS)
            .times(1)
            .returning(|_, _| Ok(DeliveryReceipt { sid: "SM1".to_string(), status: None }));

        let outcome = service(store, gateway)
            .decide(1, Decision { verdict: Verdict::Reject, user_id: 10, signature: Some("ignored".to_string()) })
            .await
            .unwrap();
        assert_eq!(outcome.new_status, AgreementStatus::Rejected);
    }

    #[tokio::test]
    async fn losing_a_race_reports_the_winning_status() {
        let mut store = MockAgreementStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_find_agreement()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(agreement(id, AgreementStatus::Pending))));
        store
            .expect_resolve_pending()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(false));
        store
            .expect_find_agreement()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(agreement(id, AgreementStatus::Rejected))));
        store.expect_mark_farm_in_use().never();

        let err = service(store, MockSmsGateway::new())
            .decide(1, accept(10, Some("sig")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Agreement already rejected."));
    }

    #[tokio::test]
    async fn required_signature_policy_rejects_unsigned_acceptance() {
        let mut store = MockAgreementStore::new();
        store
            .expect_find_agreement()
            .returning(|id| Ok(Some(agreement(id, AgreementStatus::Pending))));
        store.expect_resolve_pending().never();

        let service = AgreementService::new(
            Arc::new(store),
            Notifier::new(Arc::new(MockSmsGateway::new())),
            SignaturePolicy::RequiredForAcceptance,
        );

        let err = service.decide(1, accept(10, None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_of_missing_agreement_is_not_found() {
        let mut store = MockAgreementStore::new();
        store.expect_delete_agreement().with(eq(5)).returning(|_| Ok(false));

        let err = service(store, MockSmsGateway::new()).delete(5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_enriches_rows_with_party_names() {
        let mut store = MockAgreementStore::new();
        store
            .expect_agreements_for_user()
            .with(eq(10), eq(None))
            .returning(|_, _| Ok(vec![agreement(2, AgreementStatus::Pending), agreement(1, AgreementStatus::Accepted)]));
        store
            .expect_find_users()
            .withf(|ids| ids.to_vec() == vec![10, 20])
            .returning(|_| Ok(vec![user(10, Role::Farmer, "9876543210"), user(20, Role::Contractor, "9123456780")]));

        let rows = service(store, MockSmsGateway::new()).list_for_user(10, None).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[0].farmer_name, "User 10");
        assert_eq!(rows[0].contractor_name, "User 20");
        assert_eq!(rows[0].terms, vec!["t1"]);
        assert!(!rows[1].farmer_signed);
    }
}
