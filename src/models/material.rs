use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Material {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub file_name: String,
    pub size: String,
    pub date_added: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterialRequest {
    pub subject_id: String,
    pub title: Option<String>,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Materials filed under one subject, as listed by the materials view.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialGroup {
    pub subject_id: String,
    pub subject_name: String,
    pub materials: Vec<Material>,
}
