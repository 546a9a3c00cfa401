use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMaterialId(pub String);

/// An input material held in inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterial {
    pub id: RawMaterialId,
    pub code: String,
    pub name: String,
    pub quantity_stock: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRawMaterial {
    pub code: String,
    pub name: String,
    pub quantity_stock: Decimal,
}

impl NewRawMaterial {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.code.trim().is_empty() || self.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Code, name and quantity stock are required".to_string(),
            ));
        }
        if self.quantity_stock < Decimal::ZERO {
            return Err(DomainError::Validation(
                "quantity_stock must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub quantity_stock: Option<Decimal>,
}

impl RawMaterialPatch {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.name.is_none() && self.quantity_stock.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let blank = |field: &Option<String>| field.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&self.code) || blank(&self.name) {
            return Err(DomainError::Validation("code and name must not be blank".to_string()));
        }
        match self.quantity_stock {
            Some(quantity) if quantity < Decimal::ZERO => Err(DomainError::Validation(
                "quantity_stock must not be negative".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{NewRawMaterial, RawMaterialPatch};
    use crate::errors::DomainError;

    #[test]
    fn new_raw_material_accepts_zero_stock() {
        let input = NewRawMaterial {
            code: "RM-001".to_string(),
            name: "Oak plank".to_string(),
            quantity_stock: Decimal::ZERO,
        };

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn patch_rejects_negative_stock() {
        let patch = RawMaterialPatch {
            quantity_stock: Some(Decimal::new(-5, 0)),
            ..RawMaterialPatch::default()
        };

        assert!(matches!(patch.validate(), Err(DomainError::Validation(_))));
    }
}
