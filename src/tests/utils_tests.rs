//! tests/utils_tests.rs

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::errors::ApiError;
    use crate::models::common_model::{Ordering, PageRequest, PaginationQuery};
    use crate::utils::{like_pattern, parse_date_bound, slugify};

    #[test]
    fn slugify_folds_accents_and_collapses_separators() {
        assert_eq!(slugify("País Origen"), "pais-origen");
        assert_eq!(slugify("  Tamaño   (cm) "), "tamano-cm");
        assert_eq!(slugify("voltaje_max"), "voltaje_max");
        assert_eq!(slugify("¡¡"), "");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn date_bounds_cover_whole_day() {
        let from = parse_date_bound("date_from", "2024-03-01", false).unwrap();
        let to = parse_date_bound("date_to", "2024-03-01", true).unwrap();
        assert_eq!(from, "2024-03-01T00:00:00.000000Z");
        assert_eq!(to, "2024-03-01T23:59:59.999999Z");

        match parse_date_bound("date_to", "ayer", true) {
            Err(ApiError::Validation(errors)) => assert_eq!(errors[0].field, "date_to"),
            other => panic!("se esperaba error de validación, llegó {:?}", other),
        }
    }

    #[test]
    fn ordering_falls_back_to_default() {
        let default = Ordering {
            field: "name",
            descending: false,
        };
        let allowed = ["name", "created_at"];

        let parsed = Ordering::parse(Some("-created_at"), &allowed, default);
        assert_eq!(parsed.field, "created_at");
        assert_eq!(parsed.direction(), "DESC");

        assert_eq!(Ordering::parse(Some("password_hash"), &allowed, default), default);
        assert_eq!(Ordering::parse(None, &allowed, default), default);
    }

    #[test]
    fn page_request_is_clamped_by_config() {
        let config = AppConfig::default();

        let page = PageRequest::new(
            &PaginationQuery {
                page: Some(0),
                page_size: Some(10_000),
            },
            &config,
        );
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, config.max_page_size);

        let page = PageRequest::new(&PaginationQuery::default(), &config);
        assert_eq!(page.page_size, config.default_page_size);
        assert_eq!(page.offset(), 0);

        let page = PageRequest::new(
            &PaginationQuery {
                page: Some(u64::MAX),
                page_size: Some(10),
            },
            &config,
        );
        assert!(page.offset() > 0);
        assert!(page.offset() <= i64::MAX - 10);
        assert!(page.slice(vec![1, 2, 3]).items.is_empty());

        let runaway = PageRequest {
            page: u64::MAX,
            page_size: u64::MAX,
        };
        assert_eq!(runaway.offset(), i64::MAX);
    }

    #[test]
    fn slice_paginates_in_memory() {
        let page = PageRequest {
            page: 2,
            page_size: 3,
        };
        let result = page.slice((1..=7).collect::<Vec<i32>>());
        assert_eq!(result.total, 7);
        assert_eq!(result.items, vec![4, 5, 6]);
    }
}
