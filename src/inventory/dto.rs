use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryRequest {
    #[validate(range(min = 0, message = "Units cannot be negative"))]
    pub units_available: Option<i32>,
    pub status: Option<String>,
}
