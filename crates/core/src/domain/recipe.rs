use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::raw_material::RawMaterialId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeLineId(pub String);

/// One bill-of-materials entry: how much of a raw material a single unit of
/// the product consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub id: RecipeLineId,
    pub product_id: ProductId,
    pub raw_material_id: RawMaterialId,
    pub raw_material_code: String,
    pub raw_material_name: String,
    /// Stock of the raw material at read time. Informational only; the
    /// planner works from its own virtual stock.
    pub quantity_stock: Decimal,
    pub quantity_needed: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipeLine {
    pub product_id: ProductId,
    pub raw_material_id: RawMaterialId,
    pub quantity_needed: Decimal,
}

impl NewRecipeLine {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.raw_material_id.0.trim().is_empty() {
            return Err(DomainError::Validation(
                "raw_material_id and quantity_needed are required".to_string(),
            ));
        }
        if self.quantity_needed <= Decimal::ZERO {
            return Err(DomainError::Validation(
                "quantity_needed must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::NewRecipeLine;
    use crate::domain::product::ProductId;
    use crate::domain::raw_material::RawMaterialId;
    use crate::errors::DomainError;

    fn line(quantity_needed: Decimal) -> NewRecipeLine {
        NewRecipeLine {
            product_id: ProductId("prod-1".to_string()),
            raw_material_id: RawMaterialId("rm-1".to_string()),
            quantity_needed,
        }
    }

    #[test]
    fn zero_quantity_needed_is_rejected() {
        assert_eq!(
            line(Decimal::ZERO).validate(),
            Err(DomainError::Validation("quantity_needed must be greater than 0".to_string()))
        );
    }

    #[test]
    fn fractional_quantity_needed_is_accepted() {
        assert_eq!(line(Decimal::new(25, 2)).validate(), Ok(()));
    }
}
