use crate::models::{
    AdminStats, CreateListingRequest, CreateRatingRequest, Favorite, Listing, Rating,
    SaveFavoriteRequest, SaveOutcome, UpdateListingRequest, User,
};
use crate::query::{ListingQuery, SortField, SortOrder};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder, types::Json};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, one method
/// per store operation. Handlers interact with the data layer through this
/// trait only, so the Postgres implementation can be swapped for a mock in
/// tests.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Listing retrieval ---
    async fn list_listings(&self) -> Result<Vec<Listing>, sqlx::Error>;
    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, sqlx::Error>;
    // Newest listings first, capped.
    async fn latest_listings(&self, limit: i64) -> Result<Vec<Listing>, sqlx::Error>;
    // Case-insensitive substring match over property name OR location.
    async fn search_listings(&self, search: &str) -> Result<Vec<Listing>, sqlx::Error>;
    // Whole collection ordered by one whitelisted field.
    async fn sorted_listings(
        &self,
        field: SortField,
        order: SortOrder,
    ) -> Result<Vec<Listing>, sqlx::Error>;
    // One page of filtered results plus the total matching count; both sides
    // derive from the same filter.
    async fn query_listings(
        &self,
        query: &ListingQuery,
    ) -> Result<(Vec<Listing>, i64), sqlx::Error>;
    async fn listings_by_owner(&self, email: &str) -> Result<Vec<Listing>, sqlx::Error>;

    // --- Listing mutations ---
    async fn create_listing(&self, req: CreateListingRequest) -> Result<Listing, sqlx::Error>;
    // Merges supplied fields; absent fields keep their stored value.
    async fn update_listing(
        &self,
        id: Uuid,
        req: UpdateListingRequest,
    ) -> Result<Option<Listing>, sqlx::Error>;
    // Returns the number of rows removed (0 when the id was absent).
    async fn delete_listing(&self, id: Uuid) -> Result<u64, sqlx::Error>;
    async fn increment_view_count(&self, id: Uuid) -> Result<u64, sqlx::Error>;
    // Assigns every listing without a view count a random starter value.
    async fn backfill_view_counts(&self) -> Result<u64, sqlx::Error>;

    // --- Ratings ---
    async fn ratings_by_reviewer(&self, email: &str) -> Result<Vec<Rating>, sqlx::Error>;
    async fn ratings_by_listing(&self, property_id: Uuid) -> Result<Vec<Rating>, sqlx::Error>;
    async fn create_rating(&self, req: CreateRatingRequest) -> Result<Rating, sqlx::Error>;

    // --- Favorites ---
    // Create-if-absent keyed on (user_id, property_id).
    async fn save_favorite(&self, req: SaveFavoriteRequest) -> Result<SaveOutcome, sqlx::Error>;

    // --- Users / Admin ---
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn admin_stats(&self) -> Result<AdminStats, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const LISTING_COLUMNS: &str =
    "id, property_name, location, category, user_email, view_count, created_at, attributes";
const RATING_COLUMNS: &str = "id, reviewer_email, property_id, rating, comment, created_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries are runtime-checked (`sqlx::query_as`/`QueryBuilder`) so the
/// crate builds without a reachable database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the `/properties` filter clauses to a builder whose query already
/// ends in `WHERE 1=1`. Shared between the page query and the count query so
/// the pair can never drift apart.
fn push_listing_filters(builder: &mut QueryBuilder<'_, sqlx::Postgres>, query: &ListingQuery) {
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search);
        builder.push(" AND (property_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR location ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(category) = &query.category {
        builder.push(" AND category = ");
        builder.push_bind(category.clone());
    }
    // Equality here while `search` matches the same column by substring;
    // inherited behavior, kept as-is.
    if let Some(location) = &query.location {
        builder.push(" AND location = ");
        builder.push_bind(location.clone());
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_listings(&self) -> Result<Vec<Listing>, sqlx::Error> {
        let sql = format!("SELECT {} FROM listings", LISTING_COLUMNS);
        sqlx::query_as::<_, Listing>(&sql).fetch_all(&self.pool).await
    }

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, sqlx::Error> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn latest_listings(&self, limit: i64) -> Result<Vec<Listing>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM listings ORDER BY created_at DESC LIMIT $1",
            LISTING_COLUMNS
        );
        sqlx::query_as::<_, Listing>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    async fn search_listings(&self, search: &str) -> Result<Vec<Listing>, sqlx::Error> {
        // An empty search degenerates to %%, which matches everything; same
        // behavior as an empty regex in the original service.
        let pattern = format!("%{}%", search);
        let sql = format!(
            "SELECT {} FROM listings WHERE property_name ILIKE $1 OR location ILIKE $1",
            LISTING_COLUMNS
        );
        sqlx::query_as::<_, Listing>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
    }

    async fn sorted_listings(
        &self,
        field: SortField,
        order: SortOrder,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        // field/order come from the whitelist enums, never raw caller input.
        let sql = format!(
            "SELECT {} FROM listings ORDER BY {} {}",
            LISTING_COLUMNS,
            field.column(),
            order.sql()
        );
        sqlx::query_as::<_, Listing>(&sql).fetch_all(&self.pool).await
    }

    async fn query_listings(
        &self,
        query: &ListingQuery,
    ) -> Result<(Vec<Listing>, i64), sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM listings WHERE 1=1", LISTING_COLUMNS));
        push_listing_filters(&mut builder, query);
        builder.push(format!(
            " ORDER BY {} {}",
            query.sort_field.column(),
            query.sort_order.sql()
        ));
        builder.push(" LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.skip());
        let items = builder
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;

        // Separate count over the same filter. Not transactional with the
        // page query; a concurrent write can shift the totals slightly.
        let mut count_builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM listings WHERE 1=1");
        push_listing_filters(&mut count_builder, query);
        let total_items: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total_items))
    }

    async fn listings_by_owner(&self, email: &str) -> Result<Vec<Listing>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM listings WHERE user_email = $1 ORDER BY created_at DESC",
            LISTING_COLUMNS
        );
        sqlx::query_as::<_, Listing>(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await
    }

    async fn create_listing(&self, req: CreateListingRequest) -> Result<Listing, sqlx::Error> {
        // The creation timestamp is server-assigned; the view counter stays
        // absent until first touched.
        let sql = format!(
            "INSERT INTO listings (id, property_name, location, category, user_email, created_at, attributes) \
             VALUES ($1, $2, $3, $4, $5, NOW(), $6) \
             RETURNING {}",
            LISTING_COLUMNS
        );
        sqlx::query_as::<_, Listing>(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.property_name)
            .bind(&req.location)
            .bind(&req.category)
            .bind(&req.user_email)
            .bind(Json(&req.attributes))
            .fetch_one(&self.pool)
            .await
    }

    async fn update_listing(
        &self,
        id: Uuid,
        req: UpdateListingRequest,
    ) -> Result<Option<Listing>, sqlx::Error> {
        // COALESCE keeps untouched columns; extra attributes merge over the
        // stored object instead of replacing it.
        let sql = format!(
            "UPDATE listings \
             SET property_name = COALESCE($2, property_name), \
                 location = COALESCE($3, location), \
                 category = COALESCE($4, category), \
                 user_email = COALESCE($5, user_email), \
                 attributes = attributes || $6 \
             WHERE id = $1 \
             RETURNING {}",
            LISTING_COLUMNS
        );
        sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .bind(req.property_name)
            .bind(req.location)
            .bind(req.category)
            .bind(req.user_email)
            .bind(Json(req.attributes))
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_listing(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        // A listing that has never been viewed or backfilled has no counter
        // yet; the first increment starts it at 1.
        let result =
            sqlx::query("UPDATE listings SET view_count = COALESCE(view_count, 0) + 1 WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn backfill_view_counts(&self) -> Result<u64, sqlx::Error> {
        // Random starter value in [50, 150), chosen per row.
        let result = sqlx::query(
            "UPDATE listings SET view_count = 50 + floor(random() * 100)::bigint \
             WHERE view_count IS NULL",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn ratings_by_reviewer(&self, email: &str) -> Result<Vec<Rating>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM ratings WHERE reviewer_email = $1 ORDER BY created_at DESC",
            RATING_COLUMNS
        );
        sqlx::query_as::<_, Rating>(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await
    }

    async fn ratings_by_listing(&self, property_id: Uuid) -> Result<Vec<Rating>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM ratings WHERE property_id = $1 ORDER BY created_at DESC",
            RATING_COLUMNS
        );
        sqlx::query_as::<_, Rating>(&sql)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn create_rating(&self, req: CreateRatingRequest) -> Result<Rating, sqlx::Error> {
        let sql = format!(
            "INSERT INTO ratings (id, reviewer_email, property_id, rating, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             RETURNING {}",
            RATING_COLUMNS
        );
        sqlx::query_as::<_, Rating>(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.reviewer_email)
            .bind(req.property_id)
            .bind(req.rating)
            .bind(&req.comment)
            .fetch_one(&self.pool)
            .await
    }

    async fn save_favorite(&self, req: SaveFavoriteRequest) -> Result<SaveOutcome, sqlx::Error> {
        // The unique index on (user_id, property_id) makes the insert the
        // existence check: no returned row means the pair was already saved.
        // Two concurrent identical requests therefore yield one row and one
        // AlreadySaved, never a duplicate.
        let row = sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (id, user_id, property_id, saved_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (user_id, property_id) DO NOTHING \
             RETURNING id, user_id, property_id, saved_at",
        )
        .bind(Uuid::new_v4())
        .bind(&req.user_id)
        .bind(req.property_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(favorite) => SaveOutcome::Saved(favorite),
            None => SaveOutcome::AlreadySaved,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn admin_stats(&self) -> Result<AdminStats, sqlx::Error> {
        let total_listings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;
        let total_ratings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
            .fetch_one(&self.pool)
            .await?;
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_favorites: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites")
            .fetch_one(&self.pool)
            .await?;
        Ok(AdminStats {
            total_listings,
            total_ratings,
            total_users,
            total_favorites,
        })
    }
}
