use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Farm availability stored as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum FarmStatus {
    #[sea_orm(string_value = "available")]
    #[serde(rename = "available")]
    Available,
    #[sea_orm(string_value = "in_use")]
    #[serde(rename = "in_use")]
    InUse,
}

/// SeaORM entity for the `farm_details` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "farm_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Short opaque token that agreements reference.
    #[sea_orm(unique)]
    pub farm_id: String,
    pub user_id: i32,
    pub soil_type: Option<String>,
    pub water_source: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub land_area: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub location_address: Option<String>,
    pub pincode: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub preferred_crops: Option<String>,
    pub utara_file_path: Option<String>,
    pub land_image_path: Option<String>,
    pub status: FarmStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Generate a fresh farm token: the first 20 characters of a v4 UUID.
/// Width of the `farm_id` column.
pub const FARM_TOKEN_LEN: usize = 20;

pub fn new_farm_token() -> String {
    Uuid::new_v4().to_string().chars().take(FARM_TOKEN_LEN).collect()
}

// ── DTOs ──

/// Fields shared by `POST /add` and farmer registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmFields {
    #[serde(rename = "soilType", default, deserialize_with = "super::lenient_string")]
    pub soil_type: Option<String>,
    #[serde(rename = "waterSource", default, deserialize_with = "super::lenient_string")]
    pub water_source: Option<String>,
    #[serde(rename = "landArea", default, deserialize_with = "super::lenient_f64")]
    pub land_area: Option<f64>,
    #[serde(rename = "locationAddress", default, deserialize_with = "super::lenient_string")]
    pub location_address: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub pincode: Option<String>,
    #[serde(rename = "preferredCrops", default, deserialize_with = "super::lenient_string")]
    pub preferred_crops: Option<String>,
}

/// Body of `POST /add`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFarmRequest {
    #[serde(rename = "userId", default, deserialize_with = "super::lenient_id")]
    pub user_id: Option<i32>,
    #[serde(flatten)]
    pub fields: FarmFields,
}

/// Body of `PUT /{id}`. Absent fields are left unchanged.
pub type UpdateFarm = FarmFields;

/// A validated farm ready to insert.
#[derive(Debug, Clone)]
pub struct NewFarm {
    pub user_id: i32,
    pub soil_type: Option<String>,
    pub water_source: Option<String>,
    pub land_area: f64,
    pub location_address: Option<String>,
    pub pincode: Option<String>,
    pub preferred_crops: Option<String>,
    pub utara_file_path: Option<String>,
    pub land_image_path: Option<String>,
}

impl FarmFields {
    /// Validate for insertion. Land area is required and must be positive.
    pub fn into_new_farm(self, user_id: i32) -> Result<NewFarm, String> {
        let land_area = check_land_area(self.land_area)?
            .ok_or_else(|| "Land area is required.".to_string())?;

        Ok(NewFarm {
            user_id,
            soil_type: self.soil_type,
            water_source: self.water_source,
            land_area,
            location_address: self.location_address,
            pincode: self.pincode,
            preferred_crops: self.preferred_crops,
            utara_file_path: None,
            land_image_path: None,
        })
    }

    /// Validate a partial update.
    pub fn checked(self) -> Result<Self, String> {
        check_land_area(self.land_area)?;
        Ok(self)
    }
}

fn check_land_area(area: Option<f64>) -> Result<Option<f64>, String> {
    match area {
        Some(a) if !(a.is_finite() && a > 0.0) => {
            Err("Land area must be a positive number of acres.".to_string())
        }
        other => Ok(other),
    }
}

/// Row of `GET /get-farmers`.
#[derive(Debug, Clone, Serialize)]
pub struct FarmerListing {
    #[serde(rename = "userId")]
    pub user_id: i32,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "farmId")]
    pub farm_id: String,
    #[serde(rename = "locationAddress")]
    pub location_address: Option<String>,
    #[serde(rename = "landArea")]
    pub land_area: f64,
    #[serde(rename = "preferredCrops")]
    pub preferred_crops: Option<String>,
    pub land_image_path: Option<String>,
    pub status: FarmStatus,
}

/// Body of `GET /farmer/profile/{id}`: the farmer joined with their first farm.
#[derive(Debug, Clone, Serialize)]
pub struct FarmerProfile {
    #[serde(rename = "userId")]
    pub user_id: i32,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub contact: String,
    #[serde(rename = "userType")]
    pub user_type: super::users::Role,
    #[serde(rename = "farmId")]
    pub farm_id: String,
    #[serde(rename = "soilType")]
    pub soil_type: Option<String>,
    #[serde(rename = "waterSource")]
    pub water_source: Option<String>,
    #[serde(rename = "landArea")]
    pub land_area: f64,
    #[serde(rename = "locationAddress")]
    pub location_address: Option<String>,
    pub pincode: Option<String>,
    #[serde(rename = "preferredCrops")]
    pub preferred_crops: Option<String>,
    pub utara_file_path: Option<String>,
    pub land_image_path: Option<String>,
    pub status: FarmStatus,
    #[serde(rename = "farmCreatedAt")]
    pub farm_created_at: DateTimeUtc,
}

impl FarmerProfile {
    pub fn new(user: super::users::Model, farm: Model) -> Self {
        Self {
            user_id: user.id,
            full_name: user.full_name,
            contact: user.contact,
            user_type: user.user_type,
            farm_id: farm.farm_id,
            soil_type: farm.soil_type,
            water_source: farm.water_source,
            land_area: farm.land_area,
            location_address: farm.location_address,
            pincode: farm.pincode,
            preferred_crops: farm.preferred_crops,
            utara_file_path: farm.utara_file_path,
            land_image_path: farm.land_image_path,
            status: farm.status,
            farm_created_at: farm.created_at,
        }
    }
}

/// Body of `PUT /farmer/profile/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFarmerProfile {
    #[serde(flatten)]
    pub contact: super::users::UpdateContact,
    #[serde(rename = "soilType", default, deserialize_with = "super::lenient_string")]
    pub soil_type: Option<String>,
    #[serde(rename = "preferredCrops", default, deserialize_with = "super::lenient_string")]
    pub preferred_crops: Option<String>,
    #[serde(rename = "locationAddress", default, deserialize_with = "super::lenient_string")]
    pub location_address: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub pincode: Option<String>,
}
