use std::collections::HashSet;

use validator::ValidationError;

use crate::models::IngredientAmountDto;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn check_unique(ids: impl IntoIterator<Item = i64>, what: &str) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(error("duplicate", format!("{} must not repeat (id {})", what, id)));
        }
    }
    Ok(())
}

pub fn validate_tag_ids(ids: &[i64]) -> Result<(), ValidationError> {
    check_unique(ids.iter().copied(), "Tags")
}

pub fn validate_ingredient_amounts(items: &[IngredientAmountDto]) -> Result<(), ValidationError> {
    check_unique(items.iter().map(|item| item.id), "Ingredients")
}

/// Only checks the envelope; decoding happens when the image is stored
pub fn validate_image(data: &str) -> Result<(), ValidationError> {
    if data.trim().is_empty() {
        return Err(error("image_empty", "Image must not be empty".to_string()));
    }
    if !data.trim_start().starts_with("data:image/") {
        return Err(error(
            "image_format",
            "Image must be a base64 data:image URI".to_string(),
        ));
    }
    Ok(())
}
