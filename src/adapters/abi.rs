//! JSON contract interfaces loaded at startup

use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt};
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Bytes, U256};
use std::path::Path;

use crate::error::{ClaimerError, Result};

/// A contract's callable surface, used to encode calls by name
#[derive(Debug, Clone)]
pub struct ContractInterface {
    name: String,
    abi: JsonAbi,
}

impl ContractInterface {
    /// Load an interface file. Missing files and malformed JSON are fatal.
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClaimerError::Abi(format!(
                "Contract ABI file not found: {} ({e})",
                path.display()
            ))
        })?;
        Self::from_json(name, &contents).map_err(|e| match e {
            ClaimerError::Abi(msg) => {
                ClaimerError::Abi(format!("{msg} in {}", path.display()))
            }
            other => other,
        })
    }

    /// Parse either a bare ABI array or a compiler artifact with an `abi` field
    pub fn from_json(name: &str, json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ClaimerError::Abi(format!("Invalid JSON format in {name} ABI: {e}")))?;

        let abi_value = match value {
            serde_json::Value::Object(mut artifact) if artifact.contains_key("abi") => {
                artifact.remove("abi").unwrap_or_default()
            }
            other => other,
        };

        let abi: JsonAbi = serde_json::from_value(abi_value)
            .map_err(|e| ClaimerError::Abi(format!("Invalid {name} ABI: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            abi,
        })
    }

    /// Fail unless every `(function, input count)` pair is present
    pub fn require(&self, functions: &[(&str, usize)]) -> Result<()> {
        let missing: Vec<String> = functions
            .iter()
            .filter(|(name, arity)| self.function(name, *arity).is_none())
            .map(|(name, arity)| format!("{name}/{arity}"))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ClaimerError::Abi(format!(
                "{} ABI lacks {}",
                self.name,
                missing.join(", ")
            )))
        }
    }

    fn function(&self, name: &str, arity: usize) -> Option<&alloy::json_abi::Function> {
        self.abi
            .function(name)?
            .iter()
            .find(|f| f.inputs.len() == arity)
    }

    /// Selector-prefixed calldata for `name(args…)`
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes> {
        let function = self.function(name, args.len()).ok_or_else(|| {
            ClaimerError::Abi(format!(
                "{} ABI has no {name} taking {} arguments",
                self.name,
                args.len()
            ))
        })?;

        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| ClaimerError::Abi(format!("Cannot encode {}.{name}: {e}", self.name)))
    }
}

/// Decode a single `uint256` return value
pub fn decode_uint(data: &[u8]) -> Result<U256> {
    let value = DynSolType::Uint(256)
        .abi_decode(data)
        .map_err(|e| ClaimerError::Abi(format!("Cannot decode uint256 return: {e}")))?;

    value
        .as_uint()
        .map(|(v, _)| v)
        .ok_or_else(|| ClaimerError::Abi("Return value is not a uint".to_string()))
}
