//! Mapping from driver errors to the domain store error.

use domain::StoreError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const COMMON_QUOTA_CONSTRAINT: &str = "promo_codes_common_quota";

/// Classifies a sqlx error for the domain layer.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::Conflict,
            Some(FOREIGN_KEY_VIOLATION) => StoreError::NotFound,
            Some(CHECK_VIOLATION) if db.constraint() == Some(COMMON_QUOTA_CONSTRAINT) => {
                StoreError::QuotaBelowUsage
            }
            _ => StoreError::Unknown(err.to_string()),
        },
        _ => StoreError::Unknown(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(store_error(sqlx::Error::RowNotFound), StoreError::NotFound);
    }

    #[test]
    fn test_pool_timeout_is_unknown() {
        assert!(matches!(
            store_error(sqlx::Error::PoolTimedOut),
            StoreError::Unknown(_)
        ));
    }
}
