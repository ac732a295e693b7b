//! tests/specification_tests.rs
//! Validación de especificaciones contra los atributos de una plantilla.

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use crate::models::attribute_model::DataType;
    use crate::models::template_model::TemplateAttributeDetail;
    use crate::services::specification::{coerce_value, validate_specifications};

    fn attribute(slug: &str, name: &str, data_type: DataType, required: bool) -> TemplateAttributeDetail {
        TemplateAttributeDetail {
            id: 1,
            template_id: 1,
            custom_attribute: Some(1),
            global_attribute: None,
            is_required: required,
            order: 0,
            default_value: None,
            is_active: true,
            attribute_name: name.to_string(),
            attribute_slug: slug.to_string(),
            attribute_type: data_type,
            attribute_unit: String::new(),
            attribute_description: String::new(),
        }
    }

    fn specs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn normalizes_every_data_type() {
        let attributes = vec![
            attribute("marca", "Marca", DataType::Text, true),
            attribute("garantia", "Garantía", DataType::Number, false),
            attribute("peso", "Peso", DataType::Decimal, false),
            attribute("importado", "Importado", DataType::Boolean, false),
            attribute("lanzamiento", "Lanzamiento", DataType::Date, false),
        ];
        let input = specs(json!({
            "marca": "  Acme  ",
            "garantia": "12",
            "peso": 1.25,
            "importado": "Sí",
            "lanzamiento": "31/12/2023",
        }));

        let validated = validate_specifications(&attributes, &input).expect("valid");

        assert_eq!(validated["marca"], json!("Acme"));
        assert_eq!(validated["garantia"], json!(12.0));
        assert_eq!(validated["peso"], json!("1.25"));
        assert_eq!(validated["importado"], json!(true));
        assert_eq!(validated["lanzamiento"], json!("2023-12-31"));
    }

    #[test]
    fn required_attribute_uses_default_or_fails() {
        let mut color = attribute("color", "Color", DataType::Text, true);
        color.default_value = Some("Negro".to_string());
        let modelo = attribute("modelo", "Modelo", DataType::Text, true);

        let errors = validate_specifications(&[color.clone(), modelo.clone()], &specs(json!({ "modelo": "" })))
            .expect_err("modelo missing");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "modelo");
        assert_eq!(errors[0].message, "Modelo is required");

        let validated =
            validate_specifications(&[color, modelo], &specs(json!({ "modelo": "X1" }))).expect("valid");
        assert_eq!(validated["color"], json!("Negro"));
    }

    #[test]
    fn zero_and_false_count_as_present() {
        let attributes = vec![
            attribute("stock-seguridad", "Stock seguridad", DataType::Number, true),
            attribute("fragil", "Frágil", DataType::Boolean, true),
        ];
        let validated = validate_specifications(
            &attributes,
            &specs(json!({ "stock-seguridad": 0, "fragil": false })),
        )
        .expect("valid");

        assert_eq!(validated["stock-seguridad"], json!(0.0));
        assert_eq!(validated["fragil"], json!(false));
    }

    #[test]
    fn optional_empty_values_are_omitted() {
        let attributes = vec![attribute("color", "Color", DataType::Text, false)];
        let validated =
            validate_specifications(&attributes, &specs(json!({ "color": "" }))).expect("valid");
        assert!(validated.is_empty());
    }

    #[test]
    fn unknown_keys_are_reported_sorted() {
        let attributes = vec![attribute("marca", "Marca", DataType::Text, false)];
        let errors = validate_specifications(
            &attributes,
            &specs(json!({ "zeta": 1, "alfa": 2, "marca": "Acme" })),
        )
        .expect_err("unknown keys");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "specifications");
        assert_eq!(errors[0].message, "Unknown attributes not in template: alfa, zeta");
    }

    #[test]
    fn inactive_attributes_are_ignored() {
        let mut retired = attribute("voltaje", "Voltaje", DataType::Number, true);
        retired.is_active = false;

        let errors = validate_specifications(&[retired], &specs(json!({ "voltaje": 220 })))
            .expect_err("inactive attribute counts as unknown");
        assert_eq!(errors[0].message, "Unknown attributes not in template: voltaje");
    }

    #[test]
    fn collects_all_errors_together() {
        let attributes = vec![
            attribute("garantia", "Garantía", DataType::Number, false),
            attribute("fragil", "Frágil", DataType::Boolean, false),
            attribute("marca", "Marca", DataType::Text, true),
        ];
        let errors = validate_specifications(
            &attributes,
            &specs(json!({ "garantia": "doce", "fragil": "quizás" })),
        )
        .expect_err("three errors");

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["garantia", "fragil", "marca"]);
    }

    #[test]
    fn coercion_error_messages() {
        assert_eq!(
            coerce_value(&json!(true), DataType::Number, "Peso").unwrap_err(),
            "Peso must be a valid number"
        );
        assert_eq!(
            coerce_value(&json!("1,5"), DataType::Decimal, "Peso").unwrap_err(),
            "Peso must be a valid decimal number"
        );
        assert_eq!(
            coerce_value(&json!(20231231), DataType::Date, "Fecha").unwrap_err(),
            "Fecha must be a date string"
        );
        assert_eq!(
            coerce_value(&json!("2023-13-01"), DataType::Date, "Fecha").unwrap_err(),
            "Fecha must be a valid date (YYYY-MM-DD, DD-MM-YYYY, or DD/MM/YYYY)"
        );
        assert_eq!(
            coerce_value(&json!(5), DataType::Text, "Marca").unwrap_err(),
            "Marca must be text"
        );
    }

    #[test]
    fn decimal_keeps_precision() {
        assert_eq!(
            coerce_value(&json!("0.10000000000000000001"), DataType::Decimal, "Peso").unwrap(),
            json!("0.10000000000000000001")
        );
        assert_eq!(
            coerce_value(&json!("-3.5e2"), DataType::Decimal, "Peso").unwrap(),
            json!("-3.5e2")
        );
    }

    #[test]
    fn date_accepts_the_three_formats() {
        for raw in ["2024-02-29", "29-02-2024", "29/02/2024"] {
            assert_eq!(
                coerce_value(&json!(raw), DataType::Date, "Fecha").unwrap(),
                json!("2024-02-29")
            );
        }
    }
}
