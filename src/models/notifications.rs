use serde::Deserialize;

use super::{lenient_id, lenient_string};

/// Body of `POST /send-sms`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendSmsRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

/// Body of `POST /send-farmer-message`: a contractor contacting a farmer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmerMessageRequest {
    #[serde(rename = "farmerId", default, deserialize_with = "lenient_id")]
    pub farmer_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(rename = "contractorName", default, deserialize_with = "lenient_string")]
    pub contractor_name: Option<String>,
    #[serde(rename = "contractorId", default, deserialize_with = "lenient_id")]
    pub contractor_id: Option<i32>,
}

/// A validated farmer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmerMessage {
    pub farmer_id: i32,
    pub contractor_id: i32,
    pub contractor_name: String,
    pub message: String,
}

impl FarmerMessageRequest {
    pub fn validate(self) -> Result<FarmerMessage, String> {
        match (self.farmer_id, self.message, self.contractor_name, self.contractor_id) {
            (Some(farmer_id), Some(message), Some(contractor_name), Some(contractor_id)) => {
                Ok(FarmerMessage {
                    farmer_id,
                    contractor_id,
                    contractor_name,
                    message,
                })
            }
            _ => Err("All fields are required".to_string()),
        }
    }
}

impl FarmerMessage {
    /// The SMS text delivered to the farmer.
    pub fn sms_body(&self) -> String {
        format!(
            "[AgroSync] New Interest from {} (Contractor ID: {}):\n{}",
            self.contractor_name, self.contractor_id, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farmer_message_needs_every_field() {
        let partial: FarmerMessageRequest =
            serde_json::from_value(serde_json::json!({"farmerId": 1, "message": "hi"})).unwrap();
        assert_eq!(partial.validate().unwrap_err(), "All fields are required");
    }

    #[test]
    fn sms_body_names_the_contractor() {
        let request: FarmerMessageRequest = serde_json::from_value(serde_json::json!({
            "farmerId": "1",
            "message": "Interested in your wheat field",
            "contractorName": "Ravi",
            "contractorId": 7,
        }))
        .unwrap();
        let message = request.validate().unwrap();

        assert_eq!(
            message.sms_body(),
            "[AgroSync] New Interest from Ravi (Contractor ID: 7):\nInterested in your wheat field"
        );
    }
}
