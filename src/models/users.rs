use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `user_type` column. Fixed at registration; no update path changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Role {
    #[sea_orm(string_value = "Farmer")]
    Farmer,
    #[sea_orm(string_value = "Contractor")]
    Contractor,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Farmer" | "farmer" => Some(Self::Farmer),
            "Contractor" | "contractor" => Some(Self::Contractor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "Farmer",
            Self::Contractor => "Contractor",
        }
    }
}

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    #[sea_orm(unique)]
    pub user_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub contact: String,
    pub user_type: Role,
    pub aadhar: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::farms::Entity")]
    Farms,
}

impl Related<super::farms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is(&self, role: Role) -> bool {
        self.user_type == role
    }
}

// ── DTOs ──

/// A validated registration, ready to insert. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub user_name: String,
    pub password_hash: String,
    pub contact: String,
    pub role: Role,
    pub aadhar: Option<String>,
}

/// Text fields of the `POST /register` form. Farm fields are only read for
/// farmers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "fullName", default, deserialize_with = "super::lenient_string")]
    pub full_name: Option<String>,
    #[serde(rename = "userName", default, deserialize_with = "super::lenient_string")]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub password: Option<String>,
    #[serde(rename = "userType", default, deserialize_with = "super::lenient_string")]
    pub user_type: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub aadhar: Option<String>,
    #[serde(flatten)]
    pub farm: super::farms::FarmFields,
}

impl RegisterForm {
    /// Check the account fields. Returns the role and credentials; the
    /// password is still plain text.
    pub fn account(&self) -> Result<(Role, &str, &str), String> {
        let (Some(user_name), Some(password)) = (self.user_name.as_deref(), self.password.as_deref())
        else {
            return Err("Please provide userName and password.".to_string());
        };
        let role = self
            .user_type
            .as_deref()
            .and_then(Role::parse)
            .ok_or_else(|| "User type must be Farmer or Contractor.".to_string())?;

        Ok((role, user_name, password))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "userName", alias = "username", default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `PUT /contractor/profile/{id}`; farmer profile edits extend it
/// with farm fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContact {
    #[serde(rename = "fullName", default, deserialize_with = "super::lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub contact: Option<String>,
}

/// A user as returned by the API; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i32,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub contact: String,
    #[serde(rename = "userType")]
    pub user_type: Role,
    pub aadhar: Option<String>,
    pub created_at: DateTimeUtc,
}

impl From<Model> for UserResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            user_name: m.user_name,
            contact: m.contact,
            user_type: m.user_type,
            aadhar: m.aadhar,
            created_at: m.created_at,
        }
    }
}

/// Entry of `GET /api/contractors`.
#[derive(Debug, Clone, Serialize)]
pub struct ContractorSummary {
    pub id: i32,
    pub name: String,
    pub contact: String,
}

impl From<Model> for ContractorSummary {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.full_name,
            contact: m.contact,
        }
    }
}
