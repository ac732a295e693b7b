//! models/template_model.rs
//! Plantillas de producto y los atributos que las componen.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::attribute_model::DataType;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "company")]
    pub company_id: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fila de `template_attributes` unida con el atributo (custom o global) al que apunta.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TemplateAttributeDetail {
    pub id: i64,
    #[serde(skip_serializing)]
    pub template_id: i64,
    pub custom_attribute: Option<i64>,
    pub global_attribute: Option<i64>,
    pub is_required: bool,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub default_value: Option<String>,
    pub is_active: bool,
    pub attribute_name: String,
    pub attribute_slug: String,
    #[sqlx(try_from = "String")]
    pub attribute_type: DataType,
    pub attribute_unit: String,
    pub attribute_description: String,
}

impl TemplateAttributeDetail {
    pub fn source(&self) -> &'static str {
        if self.custom_attribute.is_some() {
            "custom"
        } else {
            "global"
        }
    }

    pub fn structure(&self) -> AttributeStructure {
        AttributeStructure {
            id: self.id,
            slug: self.attribute_slug.clone(),
            name: self.attribute_name.clone(),
            data_type: self.attribute_type,
            unit_of_measure: self.attribute_unit.clone(),
            description: self.attribute_description.clone(),
            is_required: self.is_required,
            order: self.order,
            default_value: self.default_value.clone(),
            source: self.source(),
        }
    }
}

/// Definición que usa el frontend para construir formularios dinámicos.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeStructure {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub data_type: DataType,
    pub unit_of_measure: String,
    pub description: String,
    pub is_required: bool,
    pub order: i64,
    pub default_value: Option<String>,
    pub source: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateResponse {
    #[serde(flatten)]
    pub template: Template,
    pub template_attributes: Vec<TemplateAttributeDetail>,
    pub attribute_count: i64,
    pub product_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_structure: Option<Vec<AttributeStructure>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateStructureResponse {
    pub template_id: i64,
    pub template_name: String,
    pub description: String,
    pub attributes: Vec<AttributeStructure>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateListQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddAttributeRequest {
    pub custom_attribute: Option<i64>,
    pub global_attribute: Option<i64>,
    pub is_required: Option<bool>,
    pub order: Option<i64>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveAttributeRequest {
    pub attribute_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderEntry {
    pub id: Option<i64>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReorderAttributesRequest {
    #[serde(default)]
    pub attributes: Vec<ReorderEntry>,
}
