//! services/category_service.rs

use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::errors::{ApiError, ApiResult};
use crate::models::category_model::{Category, CategoryListQuery, CategoryRequest};
use crate::models::common_model::{Ordering, Page, PageRequest};
use crate::utils::{like_pattern, now_timestamp, required_text};

const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.name, c.description, c.company_id, c.is_active,
           (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id AND p.is_active = 1) AS product_count,
           c.created_at, c.updated_at
    FROM categories c
"#;

#[derive(Clone, Debug)]
pub struct CategoryService {
    db_pool: Pool<Sqlite>,
}

impl CategoryService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CategoryService { db_pool }
    }

    pub async fn list_categories(
        &self,
        company_id: i64,
        query: &CategoryListQuery,
        page: PageRequest,
    ) -> ApiResult<Page<Category>> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM categories c");
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

        let mut qb = QueryBuilder::<Sqlite>::new(CATEGORY_SELECT);
        push_filters(&mut qb, company_id, query);
        qb.push(format!(
            " ORDER BY c.{} {}, c.id LIMIT ",
            ordering.field,
            ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<Category>().fetch_all(&self.db_pool).await?;
        Ok(Page::new(page, total, items))
    }

    pub async fn get_category(&self, company_id: i64, id: i64) -> ApiResult<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "{} WHERE c.id = ? AND c.company_id = ? AND c.is_active = 1",
            CATEGORY_SELECT
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found."))
    }

    pub async fn create_category(&self, company_id: i64, req: CategoryRequest) -> ApiResult<Category> {
        let name = required_text("name", req.name.as_deref()).map_err(|e| ApiError::Validation(vec![e]))?;
        self.ensure_unique_name(company_id, &name, None).await?;

        let now = now_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO categories (name, description, company_id, created_at, updated_at)
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

        log::info!("Categoría {} creada en empresa {}", id, company_id);
        self.get_category(company_id, id).await
    }

    /// PUT (`partial = false`) exige `name`; PATCH conserva lo no enviado.
    pub async fn update_category(
        &self,
        company_id: i64,
        id: i64,
        req: CategoryRequest,
        partial: bool,
    ) -> ApiResult<Category> {
        let current = self.get_category(company_id, id).await?;

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

        sqlx::query("UPDATE categories SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(&description)
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        self.get_category(company_id, id).await
    }

    /// Borrado lógico; no se permite mientras tenga productos activos.
    pub async fn delete_category(&self, company_id: i64, id: i64) -> ApiResult<()> {
        let category = self.get_category(company_id, id).await?;
        if category.product_count > 0 {
            return Err(ApiError::bad_request(
                "Cannot delete category with active products",
            ));
        }

        sqlx::query("UPDATE categories SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        log::info!("Categoría {} desactivada", id);
        Ok(())
    }

    async fn ensure_unique_name(&self, company_id: i64, name: &str, exclude: Option<i64>) -> ApiResult<()> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE company_id = ? AND name = ? AND id != ?)",
        )
        .bind(company_id)
        .bind(name)
        .bind(exclude.unwrap_or(0))
        .fetch_one(&self.db_pool)
        .await?;

        if taken {
            return Err(ApiError::field(
                "name",
                "A category with this name already exists in your company.",
            ));
        }
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, company_id: i64, query: &CategoryListQuery) {
    qb.push(" WHERE c.is_active = 1 AND c.company_id = ");
    qb.push_bind(company_id);

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        qb.push(" AND c.name LIKE ");
        qb.push_bind(like_pattern(term));
        qb.push(" ESCAPE '\\'");
    }
}
