//! services/attribute_service.rs
//! Catálogo global de atributos y atributos personalizados por empresa.

use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::errors::{ApiError, ApiResult, FieldError};
use crate::models::attribute_model::{
    AttributeListQuery, AttributeRequest, CustomAttribute, DataType, GlobalAttribute,
};
use crate::models::common_model::{Ordering, Page, PageRequest};
use crate::utils::{like_pattern, now_timestamp, required_text, slugify};

/// Valores ya validados de un `AttributeRequest`.
struct AttributeFields {
    name: String,
    slug: String,
    data_type: DataType,
    unit_of_measure: String,
    description: String,
}

/// Valores actuales que un PATCH conserva.
struct CurrentAttribute<'a> {
    name: &'a str,
    data_type: DataType,
    unit_of_measure: &'a str,
    description: &'a str,
}

fn validate_request(
    req: AttributeRequest,
    current: Option<CurrentAttribute<'_>>,
) -> ApiResult<AttributeFields> {
    let mut errors = Vec::new();

    let name = match (req.name.as_deref(), &current) {
        (None, Some(cur)) => Some(cur.name.to_string()),
        (raw, _) => required_text("name", raw).map_err(|e| errors.push(e)).ok(),
    };
    let slug = name.as_deref().map(slugify).unwrap_or_default();
    if name.is_some() && slug.is_empty() {
        errors.push(FieldError::new(
            "name",
            "Name must contain at least one letter or digit.",
        ));
    }

    let data_type = match (req.data_type.as_deref(), &current) {
        (None, Some(cur)) => Some(cur.data_type),
        (None, None) => {
            errors.push(FieldError::new("data_type", "This field is required."));
            None
        }
        (Some(raw), _) => match raw.trim().parse::<DataType>() {
            Ok(dt) => Some(dt),
            Err(_) => {
                errors.push(FieldError::new(
                    "data_type",
                    format!("\"{}\" is not a valid choice.", raw),
                ));
                None
            }
        },
    };

    let keep = |value: Option<String>, cur: Option<&str>| match value {
        Some(v) => v.trim().to_string(),
        None => cur.unwrap_or("").to_string(),
    };
    let unit_of_measure = keep(req.unit_of_measure, current.as_ref().map(|c| c.unit_of_measure));
    let description = keep(req.description, current.as_ref().map(|c| c.description));

    match (name, data_type, errors.is_empty()) {
        (Some(name), Some(data_type), true) => Ok(AttributeFields {
            name,
            slug,
            data_type,
            unit_of_measure,
            description,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, alias: &str, search: Option<&str>) {
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(format!(" AND ({}.name LIKE ", alias));
        qb.push_bind(pattern.clone());
        qb.push(format!(" ESCAPE '\\' OR {}.slug LIKE ", alias));
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }
}

#[derive(Clone, Debug)]
pub struct AttributeService {
    db_pool: Pool<Sqlite>,
}

impl AttributeService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        AttributeService { db_pool }
    }

    // ---------------- Atributos globales ----------------

    pub async fn list_global(
        &self,
        query: &AttributeListQuery,
        page: PageRequest,
    ) -> ApiResult<Page<GlobalAttribute>> {
        let mut count_qb =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM global_attributes g WHERE g.is_active = 1");
        push_search(&mut count_qb, "g", query.search.as_deref());
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db_pool).await?;

        let ordering = Ordering::parse(
            query.ordering.as_deref(),
            &["name", "data_type"],
            Ordering {
                field: "name",
                descending: false,
            },
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT g.* FROM global_attributes g WHERE g.is_active = 1");
        push_search(&mut qb, "g", query.search.as_deref());
        qb.push(format!(
            " ORDER BY g.{} {}, g.id LIMIT ",
            ordering.field,
            ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb
            .build_query_as::<GlobalAttribute>()
            .fetch_all(&self.db_pool)
            .await?;
        Ok(Page::new(page, total, items))
    }

    pub async fn get_global(&self, id: i64) -> ApiResult<GlobalAttribute> {
        sqlx::query_as::<_, GlobalAttribute>(
            "SELECT * FROM global_attributes WHERE id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Global attribute not found."))
    }

    pub async fn create_global(&self, req: AttributeRequest) -> ApiResult<GlobalAttribute> {
        let fields = validate_request(req, None)?;
        self.ensure_global_slug_free(&fields.slug, None).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO global_attributes (name, slug, data_type, unit_of_measure, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.data_type.as_str())
        .bind(&fields.unit_of_measure)
        .bind(&fields.description)
        .execute(&self.db_pool)
        .await?
        .last_insert_rowid();

        log::info!("Atributo global {} ({}) creado", id, fields.slug);
        self.get_global(id).await
    }

    pub async fn update_global(
        &self,
        id: i64,
        req: AttributeRequest,
        partial: bool,
    ) -> ApiResult<GlobalAttribute> {
        let current = self.get_global(id).await?;
        let fields = validate_request(
            req,
            partial.then(|| CurrentAttribute {
                name: &current.name,
                data_type: current.data_type,
                unit_of_measure: &current.unit_of_measure,
                description: &current.description,
            }),
        )?;
        if fields.slug != current.slug {
            self.ensure_global_slug_free(&fields.slug, Some(id)).await?;
        }

        sqlx::query(
            r#"
            UPDATE global_attributes
            SET name = ?, slug = ?, data_type = ?, unit_of_measure = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.data_type.as_str())
        .bind(&fields.unit_of_measure)
        .bind(&fields.description)
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        self.get_global(id).await
    }

    pub async fn delete_global(&self, id: i64) -> ApiResult<()> {
        self.get_global(id).await?;
        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM template_attributes WHERE global_attribute_id = ? AND is_active = 1)",
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;
        if in_use {
            return Err(ApiError::bad_request(
                "Cannot delete attribute that is used in templates",
            ));
        }

        sqlx::query("UPDATE global_attributes SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    async fn ensure_global_slug_free(&self, slug: &str, exclude: Option<i64>) -> ApiResult<()> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM global_attributes WHERE slug = ? AND id != ?)",
        )
        .bind(slug)
        .bind(exclude.unwrap_or(0))
        .fetch_one(&self.db_pool)
        .await?;
        if taken {
            return Err(ApiError::field(
                "name",
                "A global attribute with this slug already exists.",
            ));
        }
        Ok(())
    }

    // ---------------- Atributos personalizados ----------------

    pub async fn list_custom(
        &self,
        company_id: i64,
        query: &AttributeListQuery,
        page: PageRequest,
    ) -> ApiResult<Page<CustomAttribute>> {
        let mut count_qb = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM custom_attributes a WHERE a.is_active = 1 AND a.company_id = ",
        );
        count_qb.push_bind(company_id);
        push_search(&mut count_qb, "a", query.search.as_deref());
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db_pool).await?;

        let ordering = Ordering::parse(
            query.ordering.as_deref(),
            &["name", "data_type", "created_at"],
            Ordering {
                field: "name",
                descending: false,
            },
        );

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT a.* FROM custom_attributes a WHERE a.is_active = 1 AND a.company_id = ",
        );
        qb.push_bind(company_id);
        push_search(&mut qb, "a", query.search.as_deref());
        qb.push(format!(
            " ORDER BY a.{} {}, a.id LIMIT ",
            ordering.field,
            ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb
            .build_query_as::<CustomAttribute>()
            .fetch_all(&self.db_pool)
            .await?;
        Ok(Page::new(page, total, items))
    }

    pub async fn get_custom(&self, company_id: i64, id: i64) -> ApiResult<CustomAttribute> {
        sqlx::query_as::<_, CustomAttribute>(
            "SELECT * FROM custom_attributes WHERE id = ? AND company_id = ? AND is_active = 1",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Custom attribute not found."))
    }

    pub async fn create_custom(
        &self,
        company_id: i64,
        req: AttributeRequest,
    ) -> ApiResult<CustomAttribute> {
        let fields = validate_request(req, None)?;
        self.ensure_custom_slug_free(company_id, &fields.slug, None)
            .await?;

        let id = sqlx::query(
            r#"
            INSERT INTO custom_attributes
                (name, slug, data_type, unit_of_measure, description, company_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.data_type.as_str())
        .bind(&fields.unit_of_measure)
        .bind(&fields.description)
        .bind(company_id)
        .bind(now_timestamp())
        .execute(&self.db_pool)
        .await?
        .last_insert_rowid();

        log::info!(
            "Atributo personalizado {} ({}) creado en empresa {}",
            id,
            fields.slug,
            company_id
        );
        self.get_custom(company_id, id).await
    }

    pub async fn update_custom(
        &self,
        company_id: i64,
        id: i64,
        req: AttributeRequest,
        partial: bool,
    ) -> ApiResult<CustomAttribute> {
        let current = self.get_custom(company_id, id).await?;
        let fields = validate_request(
            req,
            partial.then(|| CurrentAttribute {
                name: &current.name,
                data_type: current.data_type,
                unit_of_measure: &current.unit_of_measure,
                description: &current.description,
            }),
        )?;
        if fields.slug != current.slug {
            self.ensure_custom_slug_free(company_id, &fields.slug, Some(id))
                .await?;
        }

        sqlx::query(
            r#"
            UPDATE custom_attributes
            SET name = ?, slug = ?, data_type = ?, unit_of_measure = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.data_type.as_str())
        .bind(&fields.unit_of_measure)
        .bind(&fields.description)
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        self.get_custom(company_id, id).await
    }

    pub async fn delete_custom(&self, company_id: i64, id: i64) -> ApiResult<()> {
        self.get_custom(company_id, id).await?;
        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM template_attributes WHERE custom_attribute_id = ? AND is_active = 1)",
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;
        if in_use {
            return Err(ApiError::bad_request(
                "Cannot delete attribute that is used in templates",
            ));
        }

        sqlx::query("UPDATE custom_attributes SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        log::info!("Atributo personalizado {} desactivado", id);
        Ok(())
    }

    async fn ensure_custom_slug_free(
        &self,
        company_id: i64,
        slug: &str,
        exclude: Option<i64>,
    ) -> ApiResult<()> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM custom_attributes WHERE company_id = ? AND slug = ? AND id != ?)",
        )
        .bind(company_id)
        .bind(slug)
        .bind(exclude.unwrap_or(0))
        .fetch_one(&self.db_pool)
        .await?;
        if taken {
            return Err(ApiError::field(
                "name",
                "An attribute with this slug already exists in your company.",
            ));
        }
        Ok(())
    }
}
