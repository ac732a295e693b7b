//! services/specification.rs
//! Validación de las especificaciones de un producto contra los atributos de su plantilla.

use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

use crate::errors::FieldError;
use crate::models::attribute_model::DataType;
use crate::models::template_model::TemplateAttributeDetail;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Valida y normaliza `specifications` (slug → valor).
///
/// Sólo se consideran los atributos activos. Todos los errores se acumulan y se
/// devuelven juntos, un `FieldError` por slug más uno en `specifications` para las
/// claves que la plantilla no define.
pub fn validate_specifications(
    attributes: &[TemplateAttributeDetail],
    specifications: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<FieldError>> {
    let active: Vec<&TemplateAttributeDetail> = attributes.iter().filter(|a| a.is_active).collect();

    let mut errors = Vec::new();
    let mut validated = Map::new();

    for attribute in &active {
        let slug = attribute.attribute_slug.as_str();
        let mut value = specifications.get(slug).cloned().unwrap_or(Value::Null);

        if attribute.is_required && is_missing(&value) {
            match attribute.default_value.as_deref().filter(|d| !d.is_empty()) {
                Some(default) => value = Value::String(default.to_string()),
                None => {
                    errors.push(FieldError::new(
                        slug,
                        format!("{} is required", attribute.attribute_name),
                    ));
                    continue;
                }
            }
        }

        // Opcional y sin valor: se omite
        if value.is_null() || value.as_str() == Some("") {
            continue;
        }

        match coerce_value(&value, attribute.attribute_type, &attribute.attribute_name) {
            Ok(coerced) => {
                validated.insert(slug.to_string(), coerced);
            }
            Err(message) => errors.push(FieldError::new(slug, message)),
        }
    }

    let mut unknown: Vec<&str> = specifications
        .keys()
        .map(String::as_str)
        .filter(|key| !active.iter().any(|a| a.attribute_slug == *key))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        errors.push(FieldError::new(
            "specifications",
            format!("Unknown attributes not in template: {}", unknown.join(", ")),
        ));
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(errors)
    }
}

/// Un valor requerido falta si es null, "", [] o {}; 0 y false cuentan como presentes.
fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Convierte un valor al tipo declarado del atributo.
pub fn coerce_value(value: &Value, data_type: DataType, name: &str) -> Result<Value, String> {
    match data_type {
        DataType::Text => match value {
            Value::String(s) => Ok(Value::String(s.trim().to_string())),
            _ => Err(format!("{} must be text", name)),
        },
        DataType::Number => {
            let parsed = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .filter(|n| n.is_finite())
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("{} must be a valid number", name))
        }
        DataType::Decimal => {
            let text = match value {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            };
            text.filter(|t| is_decimal_literal(t))
                .map(Value::String)
                .ok_or_else(|| format!("{} must be a valid decimal number", name))
        }
        DataType::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "si" | "sí" => Ok(Value::Bool(true)),
                "false" | "0" | "no" => Ok(Value::Bool(false)),
                _ => Err(format!("{} must be true/false", name)),
            },
            _ => Err(format!("{} must be true/false", name)),
        },
        DataType::Date => match value {
            Value::String(s) => DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .ok_or_else(|| {
                    format!(
                        "{} must be a valid date (YYYY-MM-DD, DD-MM-YYYY, or DD/MM/YYYY)",
                        name
                    )
                }),
            _ => Err(format!("{} must be a date string", name)),
        },
    }
}

/// `[+-]digits[.digits][e[+-]digits]`, al menos un dígito en la mantisa.
fn is_decimal_literal(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let mut parts = mantissa.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next().unwrap_or("");
    let digits_ok = int_part.chars().all(|c| c.is_ascii_digit())
        && frac_part.chars().all(|c| c.is_ascii_digit())
        && !(int_part.is_empty() && frac_part.is_empty());

    let exponent_ok = match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
    };

    digits_ok && exponent_ok
}
