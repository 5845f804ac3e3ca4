//! Transaction policies and per-call parameters.
//!
//! Both are plain serde structs with chained `with_*` builders. [`TxPolicies`]
//! can additionally be seeded from the environment:
//!
//! - `ABI_CALL_SCRIPT_GAS_LIMIT` - gas limit for the call script
//! - `ABI_CALL_MAX_FEE` - maximum fee the submitter accepts
//! - `ABI_CALL_TIP` - tip offered to the block producer

use serde::{Deserialize, Serialize};

use crate::address::AssetId;
use crate::env_utils::{env_var, env_var_or};

/// Default gas limit for a call script when none is configured.
pub const DEFAULT_SCRIPT_GAS_LIMIT: u64 = 10_000_000;

/// Policies applied to the whole transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPolicies {
    #[serde(default)]
    pub tip: Option<u64>,
    #[serde(default)]
    pub max_fee: Option<u64>,
    pub script_gas_limit: u64,
    #[serde(default)]
    pub maturity: Option<u32>,
    #[serde(default)]
    pub witness_limit: Option<u64>,
}

impl Default for TxPolicies {
    fn default() -> Self {
        Self {
            tip: None,
            max_fee: None,
            script_gas_limit: DEFAULT_SCRIPT_GAS_LIMIT,
            maturity: None,
            witness_limit: None,
        }
    }
}

impl TxPolicies {
    /// Defaults overridden by any `ABI_CALL_*` environment variables that are set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tip: env_var("ABI_CALL_TIP").or(defaults.tip),
            max_fee: env_var("ABI_CALL_MAX_FEE").or(defaults.max_fee),
            script_gas_limit: env_var_or("ABI_CALL_SCRIPT_GAS_LIMIT", defaults.script_gas_limit),
            ..defaults
        }
    }

    pub fn with_tip(mut self, tip: u64) -> Self {
        self.tip = Some(tip);
        self
    }

    pub fn with_max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = Some(max_fee);
        self
    }

    pub fn with_script_gas_limit(mut self, limit: u64) -> Self {
        self.script_gas_limit = limit;
        self
    }

    pub fn with_maturity(mut self, maturity: u32) -> Self {
        self.maturity = Some(maturity);
        self
    }

    pub fn with_witness_limit(mut self, limit: u64) -> Self {
        self.witness_limit = Some(limit);
        self
    }
}

/// Parameters of a single contract call inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallParameters {
    /// Amount of `asset_id` forwarded to the callee.
    pub amount: u64,
    pub asset_id: AssetId,
    /// Gas forwarded to the callee; `None` forwards everything left.
    #[serde(default)]
    pub gas_forwarded: Option<u64>,
}

impl CallParameters {
    pub fn new(amount: u64, asset_id: AssetId) -> Self {
        Self {
            amount,
            asset_id,
            gas_forwarded: None,
        }
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_asset_id(mut self, asset_id: AssetId) -> Self {
        self.asset_id = asset_id;
        self
    }

    pub fn with_gas_forwarded(mut self, gas: u64) -> Self {
        self.gas_forwarded = Some(gas);
        self
    }
}
