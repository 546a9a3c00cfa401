use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

/// A finished good that can be manufactured from raw materials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    /// Monetary value of one unit.
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub value: Decimal,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.code.trim().is_empty() || self.name.trim().is_empty() {
            return Err(DomainError::Validation("Code, name and value are required".to_string()));
        }
        if self.value < Decimal::ZERO {
            return Err(DomainError::Validation("value must not be negative".to_string()));
        }
        Ok(())
    }
}

/// Partial update; `None` fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub value: Option<Decimal>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.name.is_none() && self.value.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let blank = |field: &Option<String>| field.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&self.code) || blank(&self.name) {
            return Err(DomainError::Validation("code and name must not be blank".to_string()));
        }
        if let Some(value) = self.value {
            if value < Decimal::ZERO {
                return Err(DomainError::Validation("value must not be negative".to_string()));
            }
        }
        Ok(())
    }
}
