//! Client repository
//!
//! Clients are managed by an unrelated CRUD flow; the invoicing core only
//! verifies ownership and reads the client's billing currency.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{classify, DatabaseError};

/// Database row for a client
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// ISO 4217 code of the currency the client is billed in
    pub currency: String,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Read-only repository for client lookups
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Creates a new ClientRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a non-deleted client owned by the caller
    ///
    /// Returns `None` when the client does not exist, is soft-deleted, or
    /// belongs to a different owner - the caller cannot distinguish these
    /// cases by design.
    #[instrument(skip(self), fields(owner_id = %owner_id, client_id = %client_id))]
    pub async fn find_owned(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<ClientRow>, DatabaseError> {
        sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, owner_id, name, currency, deleted_at
            FROM clients
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(client_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }
}
