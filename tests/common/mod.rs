#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use estate_portal::{
    AppState,
    auth::Claims,
    config::AppConfig,
    create_router,
    models::{
        AdminStats, CreateListingRequest, CreateRatingRequest, Favorite, Listing, Rating,
        SaveFavoriteRequest, SaveOutcome, UpdateListingRequest, User,
    },
    query::{ListingQuery, SortField, SortOrder},
    repository::{Repository, RepositoryState},
};
use serde_json::Map;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- In-memory mock of the Repository trait ---

// Handlers depend on the trait only, so an in-memory implementation with the
// same filtering/sorting/paging semantics as the Postgres one lets every
// handler be exercised without a database. `writes` counts every mutating
// call, which is what the auth tests assert stays at zero on rejection.
pub struct MockRepo {
    pub listings: Mutex<Vec<Listing>>,
    pub ratings: Mutex<Vec<Rating>>,
    pub users: Mutex<Vec<User>>,
    pub favorites: Mutex<Vec<Favorite>>,
    pub writes: Mutex<u32>,
}

impl MockRepo {
    pub fn new() -> Self {
        Self {
            listings: Mutex::new(vec![]),
            ratings: Mutex::new(vec![]),
            users: Mutex::new(vec![]),
            favorites: Mutex::new(vec![]),
            writes: Mutex::new(0),
        }
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        let repo = Self::new();
        *repo.listings.lock().unwrap() = listings;
        repo
    }

    pub fn write_count(&self) -> u32 {
        *self.writes.lock().unwrap()
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }
}

fn matches_query(listing: &Listing, query: &ListingQuery) -> bool {
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        if !listing.property_name.to_lowercase().contains(&needle)
            && !listing.location.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if let Some(category) = &query.category {
        if &listing.category != category {
            return false;
        }
    }
    if let Some(location) = &query.location {
        if &listing.location != location {
            return false;
        }
    }
    true
}

fn sort_listings(items: &mut [Listing], field: SortField, order: SortOrder) {
    items.sort_by(|a, b| {
        let ord = match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::ViewCount => a.view_count.unwrap_or(0).cmp(&b.view_count.unwrap_or(0)),
            SortField::PropertyName => a.property_name.cmp(&b.property_name),
            SortField::Location => a.location.cmp(&b.location),
            SortField::Category => a.category.cmp(&b.category),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

#[async_trait]
impl Repository for MockRepo {
    async fn list_listings(&self) -> Result<Vec<Listing>, sqlx::Error> {
        Ok(self.listings.lock().unwrap().clone())
    }

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, sqlx::Error> {
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn latest_listings(&self, limit: i64) -> Result<Vec<Listing>, sqlx::Error> {
        let mut items = self.listings.lock().unwrap().clone();
        sort_listings(&mut items, SortField::CreatedAt, SortOrder::Desc);
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn search_listings(&self, search: &str) -> Result<Vec<Listing>, sqlx::Error> {
        let needle = search.to_lowercase();
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| {
                l.property_name.to_lowercase().contains(&needle)
                    || l.location.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn sorted_listings(
        &self,
        field: SortField,
        order: SortOrder,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let mut items = self.listings.lock().unwrap().clone();
        sort_listings(&mut items, field, order);
        Ok(items)
    }

    async fn query_listings(
        &self,
        query: &ListingQuery,
    ) -> Result<(Vec<Listing>, i64), sqlx::Error> {
        let mut items: Vec<Listing> = self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| matches_query(l, query))
            .cloned()
            .collect();
        let total = items.len() as i64;
        sort_listings(&mut items, query.sort_field, query.sort_order);
        let page: Vec<Listing> = items
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn listings_by_owner(&self, email: &str) -> Result<Vec<Listing>, sqlx::Error> {
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_email == email)
            .cloned()
            .collect())
    }

    async fn create_listing(&self, req: CreateListingRequest) -> Result<Listing, sqlx::Error> {
        self.record_write();
        let listing = Listing {
            id: Uuid::new_v4(),
            property_name: req.property_name,
            location: req.location,
            category: req.category,
            user_email: req.user_email,
            view_count: None,
            created_at: Utc::now(),
            attributes: req.attributes,
        };
        self.listings.lock().unwrap().push(listing.clone());
        Ok(listing)
    }

    async fn update_listing(
        &self,
        id: Uuid,
        req: UpdateListingRequest,
    ) -> Result<Option<Listing>, sqlx::Error> {
        self.record_write();
        let mut listings = self.listings.lock().unwrap();
        let Some(listing) = listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.property_name {
            listing.property_name = name;
        }
        if let Some(location) = req.location {
            listing.location = location;
        }
        if let Some(category) = req.category {
            listing.category = category;
        }
        if let Some(email) = req.user_email {
            listing.user_email = email;
        }
        listing.attributes.extend(req.attributes);
        Ok(Some(listing.clone()))
    }

    async fn delete_listing(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        self.record_write();
        let mut listings = self.listings.lock().unwrap();
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok((before - listings.len()) as u64)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        self.record_write();
        let mut listings = self.listings.lock().unwrap();
        match listings.iter_mut().find(|l| l.id == id) {
            Some(listing) => {
                listing.view_count = Some(listing.view_count.unwrap_or(0) + 1);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn backfill_view_counts(&self) -> Result<u64, sqlx::Error> {
        self.record_write();
        let mut listings = self.listings.lock().unwrap();
        let mut touched = 0;
        for listing in listings.iter_mut() {
            if listing.view_count.is_none() {
                // Fixed value inside the production range [50, 150).
                listing.view_count = Some(77);
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn ratings_by_reviewer(&self, email: &str) -> Result<Vec<Rating>, sqlx::Error> {
        Ok(self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.reviewer_email == email)
            .cloned()
            .collect())
    }

    async fn ratings_by_listing(&self, property_id: Uuid) -> Result<Vec<Rating>, sqlx::Error> {
        Ok(self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn create_rating(&self, req: CreateRatingRequest) -> Result<Rating, sqlx::Error> {
        self.record_write();
        let rating = Rating {
            id: Uuid::new_v4(),
            reviewer_email: req.reviewer_email,
            property_id: req.property_id,
            rating: req.rating,
            comment: req.comment,
            created_at: Utc::now(),
        };
        self.ratings.lock().unwrap().push(rating.clone());
        Ok(rating)
    }

    async fn save_favorite(&self, req: SaveFavoriteRequest) -> Result<SaveOutcome, sqlx::Error> {
        let mut favorites = self.favorites.lock().unwrap();
        let exists = favorites
            .iter()
            .any(|f| f.user_id == req.user_id && f.property_id == req.property_id);
        if exists {
            return Ok(SaveOutcome::AlreadySaved);
        }
        self.record_write();
        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            property_id: req.property_id,
            saved_at: Utc::now(),
        };
        favorites.push(favorite.clone());
        Ok(SaveOutcome::Saved(favorite))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn admin_stats(&self) -> Result<AdminStats, sqlx::Error> {
        Ok(AdminStats {
            total_listings: self.listings.lock().unwrap().len() as i64,
            total_ratings: self.ratings.lock().unwrap().len() as i64,
            total_users: self.users.lock().unwrap().len() as i64,
            total_favorites: self.favorites.lock().unwrap().len() as i64,
        })
    }
}

// --- Test utilities ---

/// A minimal listing with fresh id/timestamp and no extra attributes.
pub fn listing(name: &str, location: &str, category: &str) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        property_name: name.to_string(),
        location: location.to_string(),
        category: category.to_string(),
        user_email: "owner@example.com".to_string(),
        view_count: None,
        created_at: Utc::now(),
        attributes: Map::new(),
    }
}

pub fn user(email: &str, role: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        role: role.to_string(),
    }
}

/// Builds AppState over the given mock, sharing the default test config.
pub fn test_state(mock: Arc<MockRepo>) -> AppState {
    AppState {
        repo: mock as RepositoryState,
        config: AppConfig::default(),
    }
}

/// Spawns the full router on an ephemeral port and returns its base address.
pub async fn spawn_app(mock: Arc<MockRepo>) -> String {
    let router = create_router(test_state(mock));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Signs a one-hour HS256 token for the given subject with the test secret.
pub fn bearer_token(email: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: email.to_string(),
        exp: now + 3600,
        iat: now,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(AppConfig::default().jwt_secret.as_bytes()),
    )
    .expect("token signing failed")
}
