use std::fmt;

use chrono::{DateTime, NaiveDate};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::farms::FARM_TOKEN_LEN;
use super::{lenient_f64, lenient_id, lenient_string};

/// Agreement status stored as its variant name.
///
/// `Pending` is the only initial state; `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AgreementStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Accepted")]
    Accepted,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

impl AgreementStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision a farmer can take on a pending agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Accepted" => Some(Self::Accept),
            "Rejected" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn status(self) -> AgreementStatus {
        match self {
            Self::Accept => AgreementStatus::Accepted,
            Self::Reject => AgreementStatus::Rejected,
        }
    }
}

/// Agreement kind. The wire labels are the ones the web client offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AgreementKind {
    #[sea_orm(string_value = "profit_sharing")]
    #[serde(
        rename = "Land Giving for Crop Production & Profit Sharing",
        alias = "ProfitSharing"
    )]
    ProfitSharing,
    #[sea_orm(string_value = "land_sale")]
    #[serde(rename = "Land Selling", alias = "LandSale")]
    LandSale,
}

/// SeaORM entity for the `agreements` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agreements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub farm_id: String,
    pub farmer_id: i32,
    pub contractor_id: i32,
    pub status: AgreementStatus,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub contract_details: Option<String>,
    /// JSON-encoded `Vec<String>`; see [`Model::term_list`].
    #[sea_orm(column_type = "Text")]
    pub terms: String,
    pub start_date: Date,
    pub end_date: Date,
    pub agreement_type: Option<AgreementKind>,
    #[sea_orm(column_type = "Double", nullable)]
    pub profit_share: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub sale_price: Option<f64>,
    pub payment_method: Option<String>,
    pub crop_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub penalty_clause: Option<String>,
    pub renewal_option: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub contractor_signature: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub farmer_signature: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the stored term list. Rows written by older clients may hold
    /// a bare string instead of a JSON array.
    pub fn term_list(&self) -> Vec<String> {
        serde_json::from_str(&self.terms).unwrap_or_else(|_| vec![self.terms.clone()])
    }
}

// ── DTOs ──

/// Term list as sent by the client: a JSON array, or an array the client
/// already serialized to a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TermsInput {
    List(Vec<String>),
    Text(String),
}

impl TermsInput {
    fn into_terms(self) -> Vec<String> {
        let raw = match self {
            Self::List(list) => list,
            Self::Text(text) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(list) => list,
                Err(_) => vec![text],
            },
        };
        raw.into_iter().filter_map(super::non_blank).collect()
    }
}

/// Body of `POST /agreements`. Every field is optional on the wire so that
/// missing fields are reported together by [`ProposeAgreementRequest::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposeAgreementRequest {
    #[serde(rename = "farmId", default, deserialize_with = "lenient_string")]
    pub farm_id: Option<String>,
    #[serde(rename = "farmerId", default, deserialize_with = "lenient_id")]
    pub farmer_id: Option<i32>,
    #[serde(rename = "contractorId", default, deserialize_with = "lenient_id")]
    pub contractor_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_details: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub terms: Option<TermsInput>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contractor_signature: Option<String>,
    #[serde(default)]
    pub agreement_type: Option<AgreementKind>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub profit_share: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sale_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub crop_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub penalty_clause: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub renewal_option: Option<String>,
}

/// A structurally valid proposal. Party roles are checked by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAgreement {
    pub farm_id: String,
    pub farmer_id: i32,
    pub contractor_id: i32,
    pub amount: f64,
    pub terms: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub contract_details: Option<String>,
    pub kind: Option<AgreementKind>,
    pub profit_share: Option<f64>,
    pub sale_price: Option<f64>,
    pub payment_method: Option<String>,
    pub crop_type: Option<String>,
    pub penalty_clause: Option<String>,
    pub renewal_option: Option<String>,
    pub contractor_signature: Option<String>,
}

impl ProposeAgreementRequest {
    /// Check presence of required fields, then the date range.
    pub fn validate(self) -> Result<NewAgreement, String> {
        let terms = self.terms.map(TermsInput::into_terms).unwrap_or_default();
        let details_required = self.agreement_type != Some(AgreementKind::LandSale);

        let mut missing = Vec::new();
        if self.farm_id.is_none() {
            missing.push("farmId");
        }
        if self.farmer_id.is_none() {
            missing.push("farmerId");
        }
        if self.contractor_id.is_none() {
            missing.push("contractorId");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        if terms.is_empty() {
            missing.push("terms");
        }
        if self.start_date.is_none() {
            missing.push("start_date");
        }
        if self.end_date.is_none() {
            missing.push("end_date");
        }
        if details_required && self.contract_details.is_none() {
            missing.push("contract_details");
        }
        let (Some(farm_id), Some(farmer_id), Some(contractor_id), Some(amount), true) = (
            self.farm_id,
            self.farmer_id,
            self.contractor_id,
            self.amount,
            missing.is_empty(),
        ) else {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        };

        if farm_id.chars().count() > FARM_TOKEN_LEN {
            return Err(format!("farmId must be at most {FARM_TOKEN_LEN} characters."));
        }

        if !(amount.is_finite() && amount > 0.0) {
            return Err("Amount must be a positive number.".to_string());
        }

        let start_date = parse_date("start_date", self.start_date.as_deref())?;
        let end_date = parse_date("end_date", self.end_date.as_deref())?;
        if end_date <= start_date {
            return Err("End date must be after start date.".to_string());
        }

        Ok(NewAgreement {
            farm_id,
            farmer_id,
            contractor_id,
            amount,
            terms,
            start_date,
            end_date,
            contract_details: self.contract_details,
            kind: self.agreement_type,
            profit_share: self.profit_share,
            sale_price: self.sale_price,
            payment_method: self.payment_method,
            crop_type: self.crop_type,
            penalty_clause: self.penalty_clause,
            renewal_option: self.renewal_option,
            contractor_signature: self.contractor_signature,
        })
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part is kept).
fn parse_date(field: &str, raw: Option<&str>) -> Result<NaiveDate, String> {
    let raw = raw.unwrap_or_default();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| format!("Invalid {field}: expected a date like 2025-01-31."))
}

/// Body of `PUT /agreements/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecideRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(rename = "userId", default, deserialize_with = "lenient_id")]
    pub user_id: Option<i32>,
    #[serde(alias = "signatureDataUrl", default, deserialize_with = "lenient_string")]
    pub signature: Option<String>,
}

/// A validated decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub user_id: i32,
    pub signature: Option<String>,
}

impl DecideRequest {
    pub fn validate(self) -> Result<Decision, String> {
        let (Some(status), Some(user_id)) = (self.status, self.user_id) else {
            return Err("Agreement ID, status, and user ID are required.".to_string());
        };
        let verdict = Verdict::parse(&status).ok_or_else(|| {
            "Invalid status provided. Must be \"Accepted\" or \"Rejected\".".to_string()
        })?;

        Ok(Decision {
            verdict,
            user_id,
            signature: self.signature,
        })
    }
}

/// Result of a successful decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub agreement_id: i32,
    pub new_status: AgreementStatus,
}

/// An agreement enriched with both parties' display names.
#[derive(Debug, Clone, Serialize)]
pub struct AgreementView {
    #[serde(rename = "agreementId")]
    pub id: i32,
    #[serde(rename = "farmId")]
    pub farm_id: String,
    #[serde(rename = "farmerId")]
    pub farmer_id: i32,
    #[serde(rename = "contractorId")]
    pub contractor_id: i32,
    pub status: AgreementStatus,
    pub amount: f64,
    pub contract_details: Option<String>,
    pub terms: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub agreement_type: Option<AgreementKind>,
    pub profit_share: Option<f64>,
    pub sale_price: Option<f64>,
    pub payment_method: Option<String>,
    pub crop_type: Option<String>,
    pub penalty_clause: Option<String>,
    pub renewal_option: Option<String>,
    pub contractor_signature: Option<String>,
    pub farmer_signature: Option<String>,
    /// False for an agreement accepted without a signature.
    #[serde(rename = "farmerSigned")]
    pub farmer_signed: bool,
    #[serde(rename = "farmerName")]
    pub farmer_name: String,
    #[serde(rename = "farmerContact")]
    pub farmer_contact: String,
    #[serde(rename = "contractorName")]
    pub contractor_name: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Display details of one party to an agreement.
#[derive(Debug, Clone, Default)]
pub struct PartyDetails {
    pub name: String,
    pub contact: String,
}

impl AgreementView {
    pub fn new(model: Model, farmer: PartyDetails, contractor: PartyDetails) -> Self {
        let terms = model.term_list();
        Self {
            id: model.id,
            farm_id: model.farm_id,
            farmer_id: model.farmer_id,
            contractor_id: model.contractor_id,
            status: model.status,
            amount: model.amount,
            contract_details: model.contract_details,
            terms,
            start_date: model.start_date,
            end_date: model.end_date,
            agreement_type: model.agreement_type,
            profit_share: model.profit_share,
            sale_price: model.sale_price,
            payment_method: model.payment_method,
            crop_type: model.crop_type,
            penalty_clause: model.penalty_clause,
            renewal_option: model.renewal_option,
            contractor_signature: model.contractor_signature,
            farmer_signed: model.farmer_signature.is_some(),
            farmer_signature: model.farmer_signature,
            farmer_name: farmer.name,
            farmer_contact: farmer.contact,
            contractor_name: contractor.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposal(body: serde_json::Value) -> ProposeAgreementRequest {
        serde_json::from_value(body).unwrap()
    }

    fn complete() -> serde_json::Value {
        json!({
            "farmId": "f-123",
            "farmerId": 10,
            "contractorId": "20",
            "amount": "5000",
            "terms": ["t1"],
            "start_date": "2025-01-01",
            "end_date": "2025-06-01",
            "contract_details": "Wheat season",
        })
    }

    #[test]
    fn a_complete_proposal_validates() {
        let agreement = proposal(complete()).validate().unwrap();

        assert_eq!(agreement.farmer_id, 10);
        assert_eq!(agreement.contractor_id, 20);
        assert_eq!(agreement.amount, 5000.0);
        assert_eq!(agreement.terms, vec!["t1".to_string()]);
        assert_eq!(agreement.end_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn every_missing_field_is_listed() {
        let err = proposal(json!({"farmId": "f-1"})).validate().unwrap_err();

        assert!(err.starts_with("Missing required fields"));
        for field in ["farmerId", "contractorId", "amount", "terms", "start_date", "end_date", "contract_details"] {
            assert!(err.contains(field), "{field} not reported in {err}");
        }
        assert!(!err.contains("farmId,"));
    }

    #[test]
    fn land_sale_does_not_need_contract_details() {
        let mut body = complete();
        body["contract_details"] = json!("");
        body["agreement_type"] = json!("Land Selling");
        let agreement = proposal(body).validate().unwrap();

        assert_eq!(agreement.kind, Some(AgreementKind::LandSale));
        assert!(agreement.contract_details.is_none());

        let mut body = complete();
        body["contract_details"] = json!("");
        body["agreement_type"] = json!("ProfitSharing");
        assert!(proposal(body).validate().unwrap_err().contains("contract_details"));
    }

    #[test]
    fn end_date_must_follow_start_date() {
        for end in ["2025-01-01", "2024-12-31"] {
            let mut body = complete();
            body["end_date"] = json!(end);
            assert_eq!(
                proposal(body).validate().unwrap_err(),
                "End date must be after start date."
            );
        }
    }

    #[test]
    fn overlong_farm_ids_are_rejected() {
        let mut body = complete();
        body["farmId"] = json!("x".repeat(FARM_TOKEN_LEN + 1));
        assert_eq!(
            proposal(body).validate().unwrap_err(),
            "farmId must be at most 20 characters."
        );

        let mut body = complete();
        body["farmId"] = json!("x".repeat(FARM_TOKEN_LEN));
        assert!(proposal(body).validate().is_ok());
    }

    #[test]
    fn empty_terms_count_as_missing() {
        let mut body = complete();
        body["terms"] = json!(["", "  "]);
        assert!(proposal(body).validate().unwrap_err().contains("terms"));
    }

    #[test]
    fn serialized_terms_are_decoded() {
        let mut body = complete();
        body["terms"] = json!("[\"a\",\"b\"]");
        assert_eq!(proposal(body).validate().unwrap().terms, vec!["a", "b"]);
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let mut body = complete();
        body["amount"] = json!(-5);
        assert_eq!(proposal(body).validate().unwrap_err(), "Amount must be a positive number.");
    }

    #[test]
    fn decide_requires_a_terminal_status() {
        let ok: DecideRequest =
            serde_json::from_value(json!({"status": "Accepted", "userId": 10, "signature": "data:image/png;base64,AA"}))
                .unwrap();
        let decision = ok.validate().unwrap();
        assert_eq!(decision.verdict, Verdict::Accept);
        assert_eq!(decision.verdict.status(), AgreementStatus::Accepted);

        let pending: DecideRequest =
            serde_json::from_value(json!({"status": "Pending", "userId": 10})).unwrap();
        assert!(pending.validate().unwrap_err().starts_with("Invalid status"));

        let missing: DecideRequest = serde_json::from_value(json!({"status": "Rejected"})).unwrap();
        assert!(missing.validate().unwrap_err().contains("required"));
    }

    #[test]
    fn bare_string_terms_survive_decoding() {
        let model = Model {
            id: 1,
            farm_id: "f".into(),
            farmer_id: 1,
            contractor_id: 2,
            status: AgreementStatus::Pending,
            amount: 1.0,
            contract_details: None,
            terms: "legacy term".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            agreement_type: None,
            profit_share: None,
            sale_price: None,
            payment_method: None,
            crop_type: None,
            penalty_clause: None,
            renewal_option: None,
            contractor_signature: None,
            farmer_signature: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(model.term_list(), vec!["legacy term"]);
    }
}
