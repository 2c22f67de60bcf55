use super::ApiError;
use super::types::ListQuery;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

/// Resolves `limit`/`offset` query params against the defaults and bounds.
pub fn validate_pagination(query: &ListQuery) -> Result<(u64, u64), ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            limit, MAX_LIMIT
        )));
    }

    Ok((limit, query.offset.unwrap_or(0)))
}
