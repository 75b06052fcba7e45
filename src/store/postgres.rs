use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{ListingStore, StoreError, UserStore};
use crate::model::user::{NewUser, Role, User};
use crate::model::waste::{Listing, ListingPatch, NewListing};

const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)",
    "CREATE TABLE IF NOT EXISTS wastes (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        quantity DOUBLE PRECISION NOT NULL,
        location TEXT NOT NULL,
        contact TEXT NOT NULL,
        farmer_id TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS wastes_farmer_created_idx ON wastes (farmer_id, created_at DESC)",
];

const LISTING_COLUMNS: &str =
    "id, title, description, quantity, location, contact, farmer_id, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(StoreError::Corrupt)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(FromRow)]
struct ListingRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    quantity: f64,
    location: String,
    contact: String,
    farmer_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            quantity: row.quantity,
            location: row.location,
            contact: row.contact,
            farmer_id: row.farmer_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL adapter for both store ports, sharing one pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Create tables and indexes when missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Duplicate
        }
        _ => StoreError::Backend(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role FROM users WHERE role = $1",
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, password_hash, role",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        User::try_from(row)
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO wastes ({LISTING_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {LISTING_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ListingRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.quantity)
            .bind(&listing.location)
            .bind(&listing.contact)
            .bind(&listing.farmer_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn find_listings(&self, farmer_id: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        let rows = match farmer_id {
            Some(farmer_id) => {
                let query = format!(
                    "SELECT {LISTING_COLUMNS} FROM wastes WHERE farmer_id = $1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, ListingRow>(&query)
                    .bind(farmer_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {LISTING_COLUMNS} FROM wastes ORDER BY created_at DESC");
                sqlx::query_as::<_, ListingRow>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<bool, StoreError> {
        // updated_at is always $1, the id comes last
        let mut query_parts = vec!["updated_at = $1".to_string()];
        let mut param_count = 2;

        for (column, present) in [
            ("title", patch.title.is_some()),
            ("description", patch.description.is_some()),
            ("quantity", patch.quantity.is_some()),
            ("location", patch.location.is_some()),
            ("contact", patch.contact.is_some()),
            ("farmer_id", patch.farmer_id.is_some()),
        ] {
            if present {
                query_parts.push(format!("{} = ${}", column, param_count));
                param_count += 1;
            }
        }

        let query_str = format!(
            "UPDATE wastes SET {} WHERE id = ${}",
            query_parts.join(", "),
            param_count
        );

        // Bind parameters in the same order as query_parts
        let mut query = sqlx::query(&query_str).bind(Utc::now());
        if let Some(title) = &patch.title {
            query = query.bind(title);
        }
        if let Some(description) = &patch.description {
            query = query.bind(description);
        }
        if let Some(quantity) = patch.quantity {
            query = query.bind(quantity);
        }
        if let Some(location) = &patch.location {
            query = query.bind(location);
        }
        if let Some(contact) = &patch.contact {
            query = query.bind(contact);
        }
        if let Some(farmer_id) = &patch.farmer_id {
            query = query.bind(farmer_id);
        }
        query = query.bind(id);

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM wastes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
