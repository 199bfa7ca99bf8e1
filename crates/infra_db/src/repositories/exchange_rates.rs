//! Exchange-rate cache lookups
//!
//! The rate cache is maintained by an external import job and is strictly
//! read-only from the invoicing core's perspective: one SELECT keyed by
//! `(currency, rate_date)`, no fallback to neighboring dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use crate::error::{classify, DatabaseError};

/// Read-only repository over the exchange-rate cache
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    pool: PgPool,
}

impl ExchangeRateRepository {
    /// Creates a new ExchangeRateRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Looks up the cached rate for a currency on a specific date
    ///
    /// Returns `None` on a cache miss; the domain layer turns that into a
    /// `MissingExchangeRate` error rather than approximating.
    #[instrument(skip(self), fields(currency = %currency, rate_date = %rate_date))]
    pub async fn find_rate(
        &self,
        currency: &str,
        rate_date: NaiveDate,
    ) -> Result<Option<Decimal>, DatabaseError> {
        sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT rate
            FROM exchange_rates
            WHERE currency = $1 AND rate_date = $2
            "#,
        )
        .bind(currency)
        .bind(rate_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }
}
