use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::items::repo::Item;
use crate::users::dto::UserResponse;

#[derive(Debug, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub tax: Option<f64>,
}

impl ItemCreate {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.len() < 2 || self.name.len() > 200 {
            return Err("Name must be 2-200 characters");
        }
        if let Some(d) = &self.description {
            if d.len() > 1000 {
                return Err("Description must be at most 1000 characters");
            }
        }
        if self.price <= 0.0 {
            return Err("Price must be greater than zero");
        }
        if let Some(tax) = self.tax {
            if !(0.0..=100.0).contains(&tax) {
                return Err("Tax must be between 0 and 100");
            }
        }
        Ok(())
    }
}

/// Partial item update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub tax: Option<f64>,
}

impl ItemUpdate {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name {
            if name.len() < 2 || name.len() > 200 {
                return Err("Name must be 2-200 characters");
            }
        }
        if let Some(d) = &self.description {
            if d.len() > 1000 {
                return Err("Description must be at most 1000 characters");
            }
        }
        if let Some(price) = self.price {
            if price <= 0.0 {
                return Err("Price must be greater than zero");
            }
        }
        if let Some(tax) = self.tax {
            if !(0.0..=100.0).contains(&tax) {
                return Err("Tax must be between 0 and 100");
            }
        }
        Ok(())
    }
}

/// Item as returned to clients, with the tax-inclusive total precomputed.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub tax: Option<f64>,
    pub total_price: f64,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

pub(crate) fn total_price(price: f64, tax: Option<f64>) -> f64 {
    match tax {
        Some(tax) => price + price * (tax / 100.0),
        None => price,
    }
}

impl From<Item> for ItemResponse {
    fn from(i: Item) -> Self {
        Self {
            id: i.id,
            name: i.name,
            description: i.description,
            price: i.price,
            tax: i.tax,
            total_price: total_price(i.price, i.tax),
            owner_id: i.owner_id,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemWithOwner {
    #[serde(flatten)]
    pub item: ItemResponse,
    pub owner: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub status: String,
}

impl MessageResponse {
    pub fn success(message: String) -> Self {
        Self {
            message,
            status: "success".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_price_applies_tax_percentage() {
        assert_eq!(total_price(100.0, Some(21.0)), 121.0);
        assert_eq!(total_price(100.0, Some(0.0)), 100.0);
        assert_eq!(total_price(50.0, None), 50.0);
    }

    #[test]
    fn create_validation_enforces_bounds() {
        let mut item = ItemCreate {
            name: "Widget".into(),
            description: None,
            price: 9.99,
            tax: Some(21.0),
        };
        assert!(item.validate().is_ok());

        item.price = 0.0;
        assert!(item.validate().is_err());
        item.price = 9.99;

        item.name = "W".into();
        assert!(item.validate().is_err());
        item.name = "Widget".into();

        item.tax = Some(101.0);
        assert!(item.validate().is_err());
    }

    #[test]
    fn update_validation_ignores_absent_fields() {
        let empty = ItemUpdate {
            name: None,
            description: None,
            price: None,
            tax: None,
        };
        assert!(empty.validate().is_ok());

        let bad_price = ItemUpdate {
            name: None,
            description: None,
            price: Some(-1.0),
            tax: None,
        };
        assert!(bad_price.validate().is_err());
    }
}
