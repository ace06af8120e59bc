use serde::Deserialize;

/// SQL query builder for the public service listing
/// Builds a single parameterized query with filters, sorting, and pagination
pub struct SqlQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_clause: Option<String>,
    limit: u32,
    offset: u32,
}

impl SqlQueryBuilder {
    pub fn new() -> Self {
        Self {
            base_query: "SELECT id, freelancer_id, title, description, category, price_cents, \
                         created_at, updated_at FROM services"
                .to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: None,
            limit: 20,
            offset: 0,
        }
    }

    /// Adds a search filter for partial title matching (case-insensitive)
    pub fn add_search_filter(&mut self, search: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("title ILIKE ${}", param_index));
        self.params.push(format!("%{}%", search));
    }

    /// Adds a category filter (case-insensitive exact match)
    pub fn add_category_filter(&mut self, category: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("category ILIKE ${}", param_index));
        self.params.push(category.to_string());
    }

    /// Adds price range filters in cents; both bounds are inclusive
    ///
    /// Parameters bind as text, so the clause carries an explicit cast.
    pub fn add_price_range(&mut self, min: Option<i64>, max: Option<i64>) {
        if let Some(min_price) = min {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("price_cents >= ${}::bigint", param_index));
            self.params.push(min_price.to_string());
        }

        if let Some(max_price) = max {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("price_cents <= ${}::bigint", param_index));
            self.params.push(max_price.to_string());
        }
    }

    /// Sets the sort order for the query
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let field_name = match field {
            SortField::Price => "price_cents",
            SortField::Created => "created_at",
        };

        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        self.order_clause = Some(format!("{} {}", field_name, order_str));
    }

    /// Sets pagination (page is 1-indexed)
    ///
    /// The offset saturates rather than overflowing for absurd page numbers;
    /// such pages are beyond any real data and simply return empty.
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = page.saturating_sub(1).saturating_mul(limit);
    }

    /// Builds the final SQL query string and its bind parameters
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        // LIMIT/OFFSET are validated integers and go into the query string
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }
}

impl Default for SqlQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters extracted from the HTTP request
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Search term for partial title matching (case-insensitive)
    pub search: Option<String>,
    /// Filter by service category
    pub category: Option<String>,
    /// Minimum price in cents (inclusive)
    pub min_price: Option<i64>,
    /// Maximum price in cents (inclusive)
    pub max_price: Option<i64>,
    /// Sort field: "price" or "created"
    pub sort: Option<String>,
    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 20, max 100)
    pub limit: Option<u32>,
}

/// Sort field options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Created,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_field: Option<SortField>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

/// Query validation error
#[derive(Debug)]
pub struct QueryValidationError {
    pub message: String,
}

impl std::fmt::Display for QueryValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryValidationError {}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates and normalizes query parameters
    pub fn validate(params: QueryParams) -> Result<ValidatedQuery, QueryValidationError> {
        let search = Self::normalize_string(params.search);
        let category = Self::normalize_string(params.category);

        let min_price = params
            .min_price
            .map(|p| Self::validate_price(p, "min_price").map(|_| p))
            .transpose()?;
        let max_price = params
            .max_price
            .map(|p| Self::validate_price(p, "max_price").map(|_| p))
            .transpose()?;

        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(QueryValidationError {
                    message: "min_price cannot be greater than max_price".to_string(),
                });
            }
        }

        let sort_field = params
            .sort
            .as_deref()
            .map(Self::parse_sort_field)
            .transpose()?;

        let sort_order = match params.order.as_deref() {
            Some(order) => Self::parse_sort_order(order)?,
            // Newest-first is the natural browsing default
            None => match sort_field {
                Some(SortField::Price) => SortOrder::Asc,
                _ => SortOrder::Desc,
            },
        };

        let page = match params.page {
            Some(p) => {
                Self::validate_positive(p, "page")?;
                p
            }
            None => 1,
        };

        let limit = match params.limit {
            Some(l) => {
                Self::validate_positive(l, "limit")?;
                if l > 100 {
                    return Err(QueryValidationError {
                        message: "limit cannot exceed 100".to_string(),
                    });
                }
                l
            }
            None => 20,
        };

        Ok(ValidatedQuery {
            search,
            category,
            min_price,
            max_price,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Trims strings; returns None when empty or whitespace-only
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    fn validate_price(price: i64, param_name: &str) -> Result<(), QueryValidationError> {
        if price < 0 {
            return Err(QueryValidationError {
                message: format!("{} must not be negative", param_name),
            });
        }
        Ok(())
    }

    fn parse_sort_field(s: &str) -> Result<SortField, QueryValidationError> {
        match s.to_lowercase().as_str() {
            "price" => Ok(SortField::Price),
            "created" => Ok(SortField::Created),
            _ => Err(QueryValidationError {
                message: format!("Invalid sort field '{}'. Must be 'price' or 'created'", s),
            }),
        }
    }

    fn parse_sort_order(s: &str) -> Result<SortOrder, QueryValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryValidationError {
                message: format!("Invalid sort order '{}'. Must be 'asc' or 'desc'", s),
            }),
        }
    }

    fn validate_positive(value: u32, param_name: &str) -> Result<(), QueryValidationError> {
        if value == 0 {
            return Err(QueryValidationError {
                message: format!("{} must be a positive number (greater than 0)", param_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> QueryParams {
        QueryParams {
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            sort: None,
            order: None,
            page: None,
            limit: None,
        }
    }

    #[test]
    fn builder_basic_query() {
        let builder = SqlQueryBuilder::new();
        let (query, params) = builder.build();

        assert!(query.starts_with("SELECT id, freelancer_id"));
        assert!(query.contains("FROM services"));
        assert!(query.contains("LIMIT 20"));
        assert!(query.contains("OFFSET 0"));
        assert!(params.is_empty());
    }

    #[test]
    fn builder_with_search() {
        let mut builder = SqlQueryBuilder::new();
        builder.add_search_filter("logo design");
        let (query, params) = builder.build();

        assert!(query.contains("WHERE"));
        assert!(query.contains("title ILIKE $1"));
        assert_eq!(params[0], "%logo design%");
    }

    #[test]
    fn builder_with_category() {
        let mut builder = SqlQueryBuilder::new();
        builder.add_category_filter("design");
        let (query, params) = builder.build();

        assert!(query.contains("category ILIKE $1"));
        assert_eq!(params[0], "design");
    }

    #[test]
    fn builder_with_price_range() {
        let mut builder = SqlQueryBuilder::new();
        builder.add_price_range(Some(500), Some(10_000));
        let (query, params) = builder.build();

        assert!(query.contains("price_cents >= $1::bigint"));
        assert!(query.contains("price_cents <= $2::bigint"));
        assert_eq!(params[0], "500");
        assert_eq!(params[1], "10000");
    }

    #[test]
    fn builder_with_sorting_and_pagination() {
        let mut builder = SqlQueryBuilder::new();
        builder.set_sort(SortField::Price, SortOrder::Asc);
        builder.set_pagination(3, 25);
        let (query, _) = builder.build();

        assert!(query.contains("ORDER BY price_cents ASC"));
        assert!(query.contains("LIMIT 25"));
        assert!(query.contains("OFFSET 50"));
    }

    #[test]
    fn builder_combined_filters_number_params_in_order() {
        let mut builder = SqlQueryBuilder::new();
        builder.add_search_filter("logo");
        builder.add_category_filter("design");
        builder.add_price_range(Some(100), Some(5000));
        builder.set_sort(SortField::Created, SortOrder::Desc);
        let (query, params) = builder.build();

        assert!(query.contains("title ILIKE $1"));
        assert!(query.contains("category ILIKE $2"));
        assert!(query.contains("price_cents >= $3::bigint"));
        assert!(query.contains("price_cents <= $4::bigint"));
        assert!(query.contains("ORDER BY created_at DESC"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn builder_offset_saturates_at_huge_page_numbers() {
        let mut builder = SqlQueryBuilder::new();
        builder.set_pagination(u32::MAX, 100);
        let (query, _) = builder.build();

        assert!(query.contains(&format!(" OFFSET {}", u32::MAX)));
    }

    #[test]
    fn validator_defaults() {
        let validated = QueryValidator::validate(empty_params()).unwrap();
        assert_eq!(validated.page, 1);
        assert_eq!(validated.limit, 20);
        assert_eq!(validated.sort_order, SortOrder::Desc);
        assert!(validated.sort_field.is_none());
    }

    #[test]
    fn validator_price_sort_defaults_ascending() {
        let mut params = empty_params();
        params.sort = Some("price".to_string());
        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.sort_field, Some(SortField::Price));
        assert_eq!(validated.sort_order, SortOrder::Asc);
    }

    #[test]
    fn validator_rejects_inverted_price_range() {
        let mut params = empty_params();
        params.min_price = Some(1000);
        params.max_price = Some(500);
        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn validator_rejects_unknown_sort() {
        let mut params = empty_params();
        params.sort = Some("rating".to_string());
        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn validator_rejects_zero_page_and_oversized_limit() {
        let mut params = empty_params();
        params.page = Some(0);
        assert!(QueryValidator::validate(params).is_err());

        let mut params = empty_params();
        params.limit = Some(101);
        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn validator_normalizes_search() {
        let mut params = empty_params();
        params.search = Some("  logo  ".to_string());
        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.search, Some("logo".to_string()));

        let mut params = empty_params();
        params.search = Some("   ".to_string());
        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.search, None);
    }
}
