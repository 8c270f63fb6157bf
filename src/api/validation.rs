use super::ApiError;

pub fn validate_id(what: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            what, id
        )));
    }
    Ok(id)
}

pub fn validate_search_title(title: &str) -> Result<&str, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search title cannot be empty"));
    }
    Ok(trimmed)
}

/// Parse a comma-separated genre id list, e.g. `1,3,7`.
pub fn parse_genre_ids(raw: &str) -> Result<Vec<i32>, ApiError> {
    let ids: Result<Vec<i32>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect();

    match ids {
        Ok(ids) if !ids.is_empty() => Ok(ids),
        _ => Err(ApiError::validation(
            "Genre ids must be a comma-separated list of integers",
        )),
    }
}
