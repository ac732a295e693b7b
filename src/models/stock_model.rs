//! models/stock_model.rs
//! Stock por bodega y movimientos (entradas, salidas, transferencias).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    In,
    Out,
    Transfer,
}

impl MovementType {
    pub const ALL: [MovementType; 3] = [MovementType::In, MovementType::Out, MovementType::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Transfer => "TRANSFER",
        }
    }

    /// Signo con que el movimiento afecta al registro de stock donde se anota.
    pub fn sign(&self) -> f64 {
        match self {
            MovementType::In => 1.0,
            MovementType::Out | MovementType::Transfer => -1.0,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            "TRANSFER" => Ok(MovementType::Transfer),
            other => Err(format!("unknown movement type: {}", other)),
        }
    }
}

impl TryFrom<String> for MovementType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementReason {
    Sale,
    Purchase,
    Loss,
    Return,
    Adjustment,
    Transfer,
}

impl MovementReason {
    pub const ALL: [MovementReason; 6] = [
        MovementReason::Sale,
        MovementReason::Purchase,
        MovementReason::Loss,
        MovementReason::Return,
        MovementReason::Adjustment,
        MovementReason::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementReason::Sale => "sale",
            MovementReason::Purchase => "purchase",
            MovementReason::Loss => "loss",
            MovementReason::Return => "return",
            MovementReason::Adjustment => "adjustment",
            MovementReason::Transfer => "transfer",
        }
    }
}

impl fmt::Display for MovementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovementReason::ALL
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown movement reason: {}", s))
    }
}

impl TryFrom<String> for MovementReason {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockRecord {
    pub id: i64,
    pub product: i64,
    pub product_name: String,
    pub product_sku: String,
    pub warehouse: i64,
    pub warehouse_name: String,
    pub current_quantity: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovement {
    pub id: i64,
    pub stock_record: i64,
    pub product_id: i64,
    pub product_name: String,
    pub warehouse_name: String,
    #[sqlx(try_from = "String")]
    pub movement_type: MovementType,
    pub quantity: f64,
    pub resulting_balance: f64,
    #[sqlx(try_from = "String")]
    pub reason: MovementReason,
    pub account: i64,
    pub account_email: String,
    pub notes: String,
    pub reference_document: String,
    pub unit_cost: Option<i64>,
    pub from_warehouse: Option<i64>,
    pub from_warehouse_name: Option<String>,
    pub to_warehouse: Option<i64>,
    pub to_warehouse_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMovementRequest {
    pub product: Option<i64>,
    pub warehouse: Option<i64>,
    pub movement_type: Option<MovementType>,
    pub quantity: Option<f64>,
    pub reason: Option<MovementReason>,
    pub notes: Option<String>,
    pub reference_document: Option<String>,
    pub unit_cost: Option<i64>,
    pub to_warehouse: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjustmentRequest {
    pub product: Option<i64>,
    pub warehouse: Option<i64>,
    pub new_quantity: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockRecordFilters {
    pub product: Option<i64>,
    pub warehouse: Option<i64>,
    pub search: Option<String>,
    pub has_stock: Option<bool>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilters {
    pub movement_type: Option<MovementType>,
    pub reason: Option<MovementReason>,
    pub product: Option<i64>,
    pub warehouse: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentQuery {
    pub hours: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReconcileResponse {
    Reconciled {
        reconciled: bool,
        old_quantity: f64,
        new_quantity: f64,
        difference: f64,
    },
    AlreadyCorrect {
        reconciled: bool,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementSummary {
    pub total_movements: i64,
    pub by_type: BTreeMap<MovementType, i64>,
    pub by_reason: BTreeMap<MovementReason, i64>,
    pub total_in: f64,
    pub total_out: f64,
    pub total_transfers: i64,
}
