use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 8;

/// PropertiesParams
///
/// The raw query parameters accepted by GET /properties. All fields are
/// optional; `page` and `limit` are taken as raw strings so a non-numeric
/// value degrades to the default instead of failing extraction with a 400.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PropertiesParams {
    /// Free-text search over property name and location (case-insensitive).
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact location match.
    pub location: Option<String>,
    /// Sort spec in `<field>-<asc|desc>` form; defaults to `createdAt-desc`.
    pub sort: Option<String>,
    /// 1-based page number; defaults to 1.
    pub page: Option<String>,
    /// Page size; defaults to 8.
    pub limit: Option<String>,
}

/// SortField
///
/// Whitelist of fields a caller may sort listings by. Sorting is restricted
/// to these typed columns; an unrecognized field name falls back to
/// `CreatedAt` rather than reaching the store with arbitrary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    ViewCount,
    PropertyName,
    Location,
    Category,
}

impl SortField {
    /// Parses the wire-level (camelCase) field name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(SortField::CreatedAt),
            "viewCount" => Some(SortField::ViewCount),
            "propertyName" => Some(SortField::PropertyName),
            "location" => Some(SortField::Location),
            "category" => Some(SortField::Category),
            _ => None,
        }
    }

    /// The column this field sorts on.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::ViewCount => "view_count",
            SortField::PropertyName => "property_name",
            SortField::Location => "location",
            SortField::Category => "category",
        }
    }
}

/// SortOrder
///
/// `asc` maps to ascending; anything else (including absent) is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(dir: &str) -> Self {
        if dir == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Parses a `<field>-<asc|desc>` sort spec. Unknown fields fall back to
/// `createdAt`; unknown directions fall back to descending.
pub fn parse_sort(spec: &str) -> (SortField, SortOrder) {
    let (field, dir) = spec.split_once('-').unwrap_or((spec, ""));
    (
        SortField::parse(field).unwrap_or(SortField::CreatedAt),
        SortOrder::parse(dir),
    )
}

/// ListingQuery
///
/// The normalized form of a GET /properties request: filters that apply, the
/// resolved sort, and the pagination window. Built once per request and
/// handed to the repository, which derives both the page query and the count
/// query from it so the two always reflect the same filter.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl Default for ListingQuery {
    fn default() -> Self {
        ListingQuery::from_params(PropertiesParams::default())
    }
}

impl ListingQuery {
    pub fn from_params(params: PropertiesParams) -> Self {
        let (sort_field, sort_order) = parse_sort(params.sort.as_deref().unwrap_or("createdAt-desc"));
        Self {
            // An empty string contributes no filter clause, it is not a
            // clause matching everything.
            search: non_empty(params.search),
            category: non_empty(params.category),
            location: non_empty(params.location),
            sort_field,
            sort_order,
            page: coerce_positive(params.page, DEFAULT_PAGE),
            limit: coerce_positive(params.limit, DEFAULT_LIMIT),
        }
    }

    /// Rows to skip before the requested page starts.
    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// ceil(total_items / limit), in integer arithmetic.
    pub fn total_pages(&self, total_items: i64) -> i64 {
        (total_items + self.limit - 1) / self.limit
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Coerces a raw textual parameter to a positive integer, degrading to the
/// default on anything non-numeric or non-positive.
fn coerce_positive(value: Option<String>, default: i64) -> i64 {
    value
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}
