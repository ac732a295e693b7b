//! services/template_service.rs
//! Plantillas y sus atributos (orden, obligatoriedad, valor por defecto).

use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::errors::{ApiError, ApiResult};
use crate::models::common_model::{MessageResponse, Ordering, Page, PageRequest};
use crate::models::template_model::{
    AddAttributeRequest, ReorderAttributesRequest, RemoveAttributeRequest, Template,
    TemplateAttributeDetail, TemplateListQuery, TemplateRequest, TemplateResponse,
    TemplateStructureResponse,
};
use crate::utils::{like_pattern, now_timestamp, required_text};

const TEMPLATE_ATTRIBUTE_SELECT: &str = r#"
    SELECT ta.id, ta.template_id,
           ta.custom_attribute_id AS custom_attribute,
           ta.global_attribute_id AS global_attribute,
           ta.is_required, ta.sort_order, ta.default_value, ta.is_active,
           COALESCE(ca.name, ga.name) AS attribute_name,
           COALESCE(ca.slug, ga.slug) AS attribute_slug,
           COALESCE(ca.data_type, ga.data_type) AS attribute_type,
           COALESCE(ca.unit_of_measure, ga.unit_of_measure) AS attribute_unit,
           COALESCE(ca.description, ga.description) AS attribute_description
    FROM template_attributes ta
    LEFT JOIN custom_attributes ca ON ca.id = ta.custom_attribute_id
    LEFT JOIN global_attributes ga ON ga.id = ta.global_attribute_id
"#;

#[derive(Clone, Debug)]
pub struct TemplateService {
    db_pool: Pool<Sqlite>,
}

impl TemplateService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        TemplateService { db_pool }
    }

    pub async fn list_templates(
        &self,
        company_id: i64,
        query: &TemplateListQuery,
        page: PageRequest,
    ) -> ApiResult<Page<TemplateResponse>> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM templates t");
        push_filters(&mut count_qb, company_id, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db_pool).await?;

        let ordering = Ordering::parse(
            query.ordering.as_deref(),
            &["name", "created_at"],
            Ordering {
                field: "name",
                descending: false,
            },
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT t.* FROM templates t");
        push_filters(&mut qb, company_id, query);
        qb.push(format!(
            " ORDER BY t.{} {}, t.id LIMIT ",
            ordering.field,
            ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());
        let templates = qb.build_query_as::<Template>().fetch_all(&self.db_pool).await?;

        let mut items = Vec::with_capacity(templates.len());
        for template in templates {
            items.push(self.template_response(template, false).await?);
        }
        Ok(Page::new(page, total, items))
    }

    pub async fn get_template(&self, company_id: i64, id: i64) -> ApiResult<Template> {
        sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE id = ? AND company_id = ? AND is_active = 1",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found."))
    }

    /// GET /templates/{id}/ : incluye `attribute_structure`.
    pub async fn retrieve_template(&self, company_id: i64, id: i64) -> ApiResult<TemplateResponse> {
        let template = self.get_template(company_id, id).await?;
        self.template_response(template, true).await
    }

    async fn template_response(
        &self,
        template: Template,
        with_structure: bool,
    ) -> ApiResult<TemplateResponse> {
        let template_attributes = self.active_attributes(template.id).await?;
        let product_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE template_id = ? AND is_active = 1",
        )
        .bind(template.id)
        .fetch_one(&self.db_pool)
        .await?;

        let attribute_structure = with_structure
            .then(|| template_attributes.iter().map(|a| a.structure()).collect());

        Ok(TemplateResponse {
            template,
            attribute_count: template_attributes.len() as i64,
            template_attributes,
            product_count,
            attribute_structure,
        })
    }

    /// Atributos activos en orden (`sort_order`, luego id).
    pub async fn active_attributes(&self, template_id: i64) -> ApiResult<Vec<TemplateAttributeDetail>> {
        let attributes = sqlx::query_as::<_, TemplateAttributeDetail>(&format!(
            "{} WHERE ta.template_id = ? AND ta.is_active = 1 ORDER BY ta.sort_order, ta.id",
            TEMPLATE_ATTRIBUTE_SELECT
        ))
        .bind(template_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(attributes)
    }

    pub async fn structure(&self, company_id: i64, id: i64) -> ApiResult<TemplateStructureResponse> {
        let template = self.get_template(company_id, id).await?;
        let attributes = self
            .active_attributes(template.id)
            .await?
            .iter()
            .map(|a| a.structure())
            .collect();

        Ok(TemplateStructureResponse {
            template_id: template.id,
            template_name: template.name,
            description: template.description,
            attributes,
        })
    }

    pub async fn create_template(&self, company_id: i64, req: TemplateRequest) -> ApiResult<TemplateResponse> {
        let name = required_text("name", req.name.as_deref()).map_err(|e| ApiError::Validation(vec![e]))?;
        self.ensure_unique_name(company_id, &name, None).await?;

        let now = now_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO templates (name, description, company_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&name)
        .bind(req.description.as_deref().map(str::trim).unwrap_or(""))
        .bind(company_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.db_pool)
        .await?
        .last_insert_rowid();

        log::info!("Plantilla {} creada en empresa {}", id, company_id);
        self.retrieve_template(company_id, id).await
    }

    pub async fn update_template(
        &self,
        company_id: i64,
        id: i64,
        req: TemplateRequest,
        partial: bool,
    ) -> ApiResult<TemplateResponse> {
        let current = self.get_template(company_id, id).await?;

        let name = match (req.name.as_deref(), partial) {
            (None, true) => current.name.clone(),
            (raw, _) => required_text("name", raw).map_err(|e| ApiError::Validation(vec![e]))?,
        };
        let description = match (req.description, partial) {
            (Some(d), _) => d.trim().to_string(),
            (None, true) => current.description.clone(),
            (None, false) => String::new(),
        };
        if name != current.name {
            self.ensure_unique_name(company_id, &name, Some(id)).await?;
        }

        sqlx::query("UPDATE templates SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(&description)
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        self.retrieve_template(company_id, id).await
    }

    pub async fn delete_template(&self, company_id: i64, id: i64) -> ApiResult<()> {
        self.get_template(company_id, id).await?;
        let has_products: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE template_id = ? AND is_active = 1)",
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;
        if has_products {
            return Err(ApiError::bad_request(
                "Cannot delete template with active products",
            ));
        }

        sqlx::query("UPDATE templates SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        log::info!("Plantilla {} desactivada", id);
        Ok(())
    }

    /// POST /templates/{id}/add_attribute/
    pub async fn add_attribute(
        &self,
        company_id: i64,
        id: i64,
        req: AddAttributeRequest,
    ) -> ApiResult<TemplateAttributeDetail> {
        let template = self.get_template(company_id, id).await?;

        let slug = match (req.custom_attribute, req.global_attribute) {
            (None, None) => {
                return Err(ApiError::field(
                    "non_field_errors",
                    "Either custom_attribute or global_attribute must be provided",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ApiError::field(
                    "non_field_errors",
                    "Only one of custom_attribute or global_attribute can be set",
                ))
            }
            (Some(custom_id), None) => {
                let row: Option<(i64, String, bool)> = sqlx::query_as(
                    "SELECT company_id, slug, is_active FROM custom_attributes WHERE id = ?",
                )
                .bind(custom_id)
                .fetch_optional(&self.db_pool)
                .await?;
                match row {
                    None => {
                        return Err(ApiError::field(
                            "custom_attribute",
                            format!("Invalid pk \"{}\" - object does not exist.", custom_id),
                        ))
                    }
                    Some((owner, _, _)) if owner != template.company_id => {
                        return Err(ApiError::bad_request(
                            "Custom attribute must belong to the same company",
                        ))
                    }
                    Some((_, _, false)) => {
                        return Err(ApiError::field("custom_attribute", "Attribute is not active"))
                    }
                    Some((_, slug, true)) => slug,
                }
            }
            (None, Some(global_id)) => {
                let row: Option<(String, bool)> =
                    sqlx::query_as("SELECT slug, is_active FROM global_attributes WHERE id = ?")
                        .bind(global_id)
                        .fetch_optional(&self.db_pool)
                        .await?;
                match row {
                    None => {
                        return Err(ApiError::field(
                            "global_attribute",
                            format!("Invalid pk \"{}\" - object does not exist.", global_id),
                        ))
                    }
                    Some((_, false)) => {
                        return Err(ApiError::field("global_attribute", "Attribute is not active"))
                    }
                    Some((slug, true)) => slug,
                }
            }
        };

        // Un slug sólo puede aparecer una vez entre los atributos activos
        let existing = self.active_attributes(template.id).await?;
        if existing.iter().any(|a| a.attribute_slug == slug) {
            return Err(ApiError::field(
                "non_field_errors",
                format!("Attribute \"{}\" is already part of this template", slug),
            ));
        }
        let order = req.order.unwrap_or_else(|| {
            existing
                .iter()
                .map(|a| a.order.saturating_add(1))
                .max()
                .unwrap_or(0)
        });

        let default_value = req
            .default_value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let attribute_id = sqlx::query(
            r#"
            INSERT INTO template_attributes
                (template_id, custom_attribute_id, global_attribute_id, is_required, sort_order, default_value)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(template.id)
        .bind(req.custom_attribute)
        .bind(req.global_attribute)
        .bind(req.is_required.unwrap_or(false))
        .bind(order)
        .bind(default_value)
        .execute(&self.db_pool)
        .await?
        .last_insert_rowid();

        self.touch(template.id).await?;
        log::info!("Atributo {} agregado a plantilla {}", slug, template.id);

        sqlx::query_as::<_, TemplateAttributeDetail>(&format!(
            "{} WHERE ta.id = ?",
            TEMPLATE_ATTRIBUTE_SELECT
        ))
        .bind(attribute_id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(ApiError::from)
    }

    /// DELETE /templates/{id}/remove_attribute/ : desactiva el atributo de la plantilla.
    pub async fn remove_attribute(
        &self,
        company_id: i64,
        id: i64,
        req: RemoveAttributeRequest,
    ) -> ApiResult<()> {
        let template = self.get_template(company_id, id).await?;
        let attribute_id = req
            .attribute_id
            .ok_or_else(|| ApiError::bad_request("attribute_id is required"))?;

        let updated = sqlx::query(
            "UPDATE template_attributes SET is_active = 0 WHERE id = ? AND template_id = ? AND is_active = 1",
        )
        .bind(attribute_id)
        .bind(template.id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(ApiError::not_found("Attribute not found in this template"));
        }
        self.touch(template.id).await?;
        Ok(())
    }

    /// PATCH /templates/{id}/reorder_attributes/ ; ids desconocidos se ignoran.
    pub async fn reorder_attributes(
        &self,
        company_id: i64,
        id: i64,
        req: ReorderAttributesRequest,
    ) -> ApiResult<MessageResponse> {
        let template = self.get_template(company_id, id).await?;
        if req.attributes.is_empty() {
            return Err(ApiError::bad_request("attributes list is required"));
        }

        let mut tx = self.db_pool.begin().await?;
        for entry in &req.attributes {
            let (Some(attribute_id), Some(order)) = (entry.id, entry.order) else {
                continue;
            };
            sqlx::query("UPDATE template_attributes SET sort_order = ? WHERE id = ? AND template_id = ?")
                .bind(order)
                .bind(attribute_id)
                .bind(template.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.touch(template.id).await?;
        Ok(MessageResponse {
            message: "Attributes reordered successfully".to_string(),
        })
    }

    async fn touch(&self, template_id: i64) -> ApiResult<()> {
        sqlx::query("UPDATE templates SET updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(template_id)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    async fn ensure_unique_name(&self, company_id: i64, name: &str, exclude: Option<i64>) -> ApiResult<()> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM templates WHERE company_id = ? AND name = ? AND id != ?)",
        )
        .bind(company_id)
        .bind(name)
        .bind(exclude.unwrap_or(0))
        .fetch_one(&self.db_pool)
        .await?;
        if taken {
            return Err(ApiError::field(
                "name",
                "A template with this name already exists in your company.",
            ));
        }
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, company_id: i64, query: &TemplateListQuery) {
    qb.push(" WHERE t.is_active = 1 AND t.company_id = ");
    qb.push_bind(company_id);
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        qb.push(" AND t.name LIKE ");
        qb.push_bind(like_pattern(term));
        qb.push(" ESCAPE '\\'");
    }
}
