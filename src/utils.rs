//! utils.rs
//! Helpers compartidos: timestamps, slugs, rangos de fecha y patrones LIKE.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::errors::{ApiError, ApiResult};

/// Timestamp RFC 3339 de ancho fijo (microsegundos, sufijo Z) para que
/// el orden lexicográfico en SQLite coincida con el cronológico.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Convierte `date_from` / `date_to` (YYYY-MM-DD o RFC 3339) en un límite
/// comparable con `created_at`. Una fecha sola como límite superior cubre el día completo.
pub fn parse_date_bound(field: &str, raw: &str, upper: bool) -> ApiResult<String> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if upper {
            date.and_hms_micro_opt(23, 59, 59, 999_999)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        return time
            .map(|naive| format_timestamp(naive.and_utc()))
            .ok_or_else(|| ApiError::field(field, "Invalid date."));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| format_timestamp(dt.with_timezone(&Utc)))
        .map_err(|_| {
            ApiError::field(
                field,
                "Enter a valid date (YYYY-MM-DD) or datetime (RFC 3339).",
            )
        })
}

/// Slug ASCII: minúsculas, acentos plegados, separadores colapsados en '-'.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        };

        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else if folded == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push('_');
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Patrón para `LIKE ? ESCAPE '\'` que busca `term` como substring literal.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Normaliza un campo de texto requerido: recorta y exige contenido.
pub fn required_text(field: &str, value: Option<&str>) -> Result<String, crate::errors::FieldError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        Some(_) => Err(crate::errors::FieldError::new(
            field,
            "This field may not be blank.",
        )),
        None => Err(crate::errors::FieldError::new(
            field,
            "This field is required.",
        )),
    }
}
