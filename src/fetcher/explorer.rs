//! Etherscan-family explorer API: request construction, response interpretation and
//! multi-file source reconstruction.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::{ContractInfo, FetchError, Network};

/// ABI value explorers return for unverified contracts.
const UNVERIFIED_ABI: &str = "Contract source code not verified";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContractSourceData {
    #[serde(rename = "SourceCode")]
    source_code: String,
    #[serde(rename = "ABI")]
    abi: String,
    #[serde(rename = "ContractName")]
    contract_name: String,
    #[serde(rename = "CompilerVersion")]
    compiler_version: String,
    #[serde(rename = "ConstructorArguments")]
    constructor_arguments: String,
}

/// Query pairs for `getsourcecode`. `chain_id` is set for the unified multi-chain endpoint.
pub fn source_query(address: &str, api_key: &str, chain_id: Option<u64>) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(5);
    if let Some(chain_id) = chain_id {
        query.push(("chainid", chain_id.to_string()));
    }
    query.push(("module", "contract".to_string()));
    query.push(("action", "getsourcecode".to_string()));
    query.push(("address", address.to_string()));
    query.push(("apikey", api_key.to_string()));
    query
}

pub fn interpret_response(network: Network, address: &str, body: &str) -> Result<ContractInfo, FetchError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| FetchError::UnknownApiFailure {
            network,
            message: format!("malformed explorer response: {e}"),
        })?;

    if response.status != "1" {
        let result = response.result.as_str().unwrap_or_default();
        let message = response.message.as_deref().unwrap_or("Unknown error");
        return Err(classify_failure(network, address, message, result));
    }

    let entry = match &response.result {
        Value::Array(entries) => entries.first().cloned(),
        _ => None,
    };
    let data: ContractSourceData = match entry {
        Some(entry) => serde_json::from_value(entry).map_err(|e| FetchError::UnknownApiFailure {
            network,
            message: format!("unexpected result layout: {e}"),
        })?,
        None => return Err(not_verified(network, address)),
    };

    if data.source_code.trim().is_empty() {
        return Err(not_verified(network, address));
    }

    let source_code = reconstruct_source(&data.source_code);
    Ok(ContractInfo {
        address: address.to_string(),
        source_code,
        contract_name: non_empty(data.contract_name).unwrap_or_else(|| "Unknown".to_string()),
        compiler_version: non_empty(data.compiler_version).unwrap_or_else(|| "Unknown".to_string()),
        blockchain: network,
        is_verified: true,
        explorer_url: format!("{}{address}", network.explorer_url()),
        abi: non_empty(data.abi).filter(|abi| abi != UNVERIFIED_ABI),
        constructor_args: non_empty(data.constructor_arguments),
    })
}

/// Map a non-success explorer reply onto the error taxonomy. Key problems are checked
/// first, then verification, then rate limits.
pub fn classify_failure(network: Network, address: &str, message: &str, result: &str) -> FetchError {
    let message_lower = message.to_ascii_lowercase();
    let result_lower = result.to_ascii_lowercase();
    let mentions = |needle: &str| message_lower.contains(needle) || result_lower.contains(needle);

    let error = if mentions("invalid api key") || mentions("missing/invalid api key") {
        FetchError::InvalidApiKey { network }
    } else if mentions("not verified") {
        not_verified(network, address)
    } else if mentions("rate limit") {
        FetchError::RateLimited { network }
    } else {
        let detail = if result.is_empty() {
            message.to_string()
        } else {
            format!("{message}: {result}")
        };
        FetchError::UnknownApiFailure {
            network,
            message: detail,
        }
    };

    debug!("Explorer reply '{}' / '{}' classified as {:?}", message, result, error);
    error
}

/// Expand explorer multi-file payloads into one annotated text; anything else is returned
/// unchanged.
///
/// `{{...}}` is standard-JSON compiler input wrapped in an extra brace pair. A single-brace
/// object mapping paths to `{content}` is the older multi-file layout.
pub fn reconstruct_source(raw: &str) -> String {
    let trimmed = raw.trim();

    let parsed = if trimmed.starts_with("{{") && trimmed.ends_with("}}") {
        serde_json::from_str::<Value>(&trimmed[1..trimmed.len() - 1])
            .ok()
            .and_then(|json| json.get("sources").cloned())
    } else if trimmed.starts_with('{') && trimmed.ends_with('}') {
        serde_json::from_str::<Value>(trimmed).ok()
    } else {
        None
    };

    let Some(Value::Object(files)) = parsed else {
        return raw.to_string();
    };

    let mut combined = String::new();
    for (path, file) in &files {
        let Some(content) = file.get("content").and_then(Value::as_str) else {
            return raw.to_string();
        };
        combined.push_str(&format!("// File: {path}\n{content}\n\n"));
    }

    if combined.is_empty() {
        return raw.to_string();
    }
    debug!("Reconstructed {} source files", files.len());
    combined
}

fn not_verified(network: Network, address: &str) -> FetchError {
    FetchError::NotVerified {
        network,
        address: address.to_string(),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
