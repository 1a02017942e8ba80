/// Transaction types for MiniChain
use crate::error::ChainError;
use serde_json::{json, Number, Value};

/// An amount of value credited to or debited from an owner.
///
/// `amount` keeps its integer or decimal form (`5` vs `0.9`) and is always
/// finite.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValueTransfer {
    pub amount: Number,
    pub owner_id: String,
}

impl ValueTransfer {
    /// Integer amount.
    pub fn new(amount: impl Into<Number>, owner_id: impl Into<String>) -> Self {
        ValueTransfer {
            amount: amount.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Fractional amount. NaN and infinities are rejected.
    pub fn from_f64(amount: f64, owner_id: impl Into<String>) -> Result<Self, ChainError> {
        let amount = Number::from_f64(amount)
            .ok_or_else(|| ChainError::InvalidAmount(format!("{} is not a finite number", amount)))?;
        Ok(ValueTransfer {
            amount,
            owner_id: owner_id.into(),
        })
    }

    /// Record form: `{"amount": .., "owner_id": ..}`.
    pub fn to_record(&self) -> Value {
        json!({
            "owner_id": self.owner_id,
            "amount": self.amount,
        })
    }

    pub fn from_record(record: &Value) -> Result<Self, ChainError> {
        serde_json::from_value(record.clone())
            .map_err(|e| ChainError::MalformedRecord(format!("Invalid value transfer: {}", e)))
    }
}

/// A movement of value: what is spent (inputs) and who receives it (outputs).
///
/// Sums are not checked; inputs and outputs are plain ordered lists.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub inputs: Vec<ValueTransfer>,
    pub outputs: Vec<ValueTransfer>,
}

impl Transaction {
    pub fn new(inputs: Vec<ValueTransfer>, outputs: Vec<ValueTransfer>) -> Self {
        Transaction { inputs, outputs }
    }

    /// Reward paid to a miner: no inputs, one output.
    pub fn reward(amount: impl Into<Number>, owner_id: impl Into<String>) -> Self {
        Transaction {
            inputs: Vec::new(),
            outputs: vec![ValueTransfer::new(amount, owner_id)],
        }
    }

    pub fn is_reward(&self) -> bool {
        self.inputs.is_empty() && self.outputs.len() == 1
    }

    pub fn to_record(&self) -> Value {
        json!({
            "inputs": self.inputs.iter().map(ValueTransfer::to_record).collect::<Vec<_>>(),
            "outputs": self.outputs.iter().map(ValueTransfer::to_record).collect::<Vec<_>>(),
        })
    }

    pub fn from_record(record: &Value) -> Result<Self, ChainError> {
        let inputs = transfers_field(record, "inputs")?;
        let outputs = transfers_field(record, "outputs")?;
        Ok(Transaction { inputs, outputs })
    }
}

fn transfers_field(record: &Value, field: &str) -> Result<Vec<ValueTransfer>, ChainError> {
    record
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| ChainError::MalformedRecord(format!("Transaction is missing '{}' list", field)))?
        .iter()
        .map(ValueTransfer::from_record)
        .collect()
}
