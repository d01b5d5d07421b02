// Listing validation for the sell page: form fields -> `ListingDraft`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{parse_js_float, ListingSeed};

/// Declared field limits. The backend rejects listings beyond these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingLimits {
    pub max_name_len: usize,
    pub max_description_len: usize,
}

impl Default for ListingLimits {
    fn default() -> Self {
        ListingLimits {
            max_name_len: 100,
            max_description_len: 500,
        }
    }
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub price: String,
}

/// A complete, validated listing ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub game_id: String,
    pub server: Option<String>,
    pub name: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Пожалуйста, заполните все поля.")]
    MissingFields,

    #[error("Пожалуйста, введите корректную цену.")]
    InvalidPrice,

    #[error("Название не должно быть длиннее {max} символов.")]
    NameTooLong { max: usize },

    #[error("Описание не должно быть длиннее {max} символов.")]
    DescriptionTooLong { max: usize },
}

/// Validate the form against the seed and limits.
///
/// Presence is checked first, then price, then lengths, so the user sees the
/// most basic problem before the finer ones.
pub fn validate(
    seed: &ListingSeed,
    form: &ListingForm,
    limits: &ListingLimits,
) -> Result<ListingDraft, ValidationError> {
    let name = form.name.trim();
    let description = form.description.trim();
    let price_text = form.price.trim();

    if name.is_empty() || description.is_empty() || price_text.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    let price = parse_js_float(price_text);
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::InvalidPrice);
    }

    if char_len(name) > limits.max_name_len {
        return Err(ValidationError::NameTooLong {
            max: limits.max_name_len,
        });
    }
    if char_len(description) > limits.max_description_len {
        return Err(ValidationError::DescriptionTooLong {
            max: limits.max_description_len,
        });
    }

    Ok(ListingDraft {
        game_id: seed.game_id.clone(),
        server: seed.server.clone(),
        name: name.to_string(),
        description: description.to_string(),
        price,
    })
}

// ---------------------------------------------------------------------------
// Description counter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionCounter {
    pub length: usize,
    pub max: usize,
}

impl DescriptionCounter {
    pub fn measure(description: &str, max: usize) -> Self {
        DescriptionCounter {
            length: char_len(description),
            max,
        }
    }

    pub fn text(&self) -> String {
        format!("{} / {}", self.length, self.max)
    }

    pub fn is_over_limit(&self) -> bool {
        self.length > self.max
    }
}

/// Length in Unicode scalar values, the unit the backend's limits use.
/// An emoji outside the BMP counts once.
fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
