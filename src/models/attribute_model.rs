//! models/attribute_model.rs
//! Atributos globales (compartidos) y personalizados (por empresa).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Number,
    Decimal,
    Boolean,
    Date,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Decimal => "decimal",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(DataType::Text),
            "number" => Ok(DataType::Number),
            "decimal" => Ok(DataType::Decimal),
            "boolean" => Ok(DataType::Boolean),
            "date" => Ok(DataType::Date),
            other => Err(format!("unknown data type: {}", other)),
        }
    }
}

impl TryFrom<String> for DataType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GlobalAttribute {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[sqlx(try_from = "String")]
    pub data_type: DataType,
    pub unit_of_measure: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomAttribute {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[sqlx(try_from = "String")]
    pub data_type: DataType,
    pub unit_of_measure: String,
    pub description: String,
    #[serde(rename = "company")]
    pub company_id: i64,
    pub is_active: bool,
    pub created_at: String,
}

/// Body de alta/edición; `data_type` llega como texto para poder reportarlo por campo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeRequest {
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub unit_of_measure: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeListQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}
