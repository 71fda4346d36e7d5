//! Solana JSON-RPC account lookup.
//!
//! Solana programs are deployed as bytecode, so the result is always an unverified
//! placeholder describing the account.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ContractInfo, FetchError, Network};

/// Owner of programs deployed through the upgradeable BPF loader.
pub const BPF_UPGRADEABLE_LOADER: &str = "BPFLoaderUpgradeab1e11111111111111111111111";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<AccountInfoResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    value: Option<AccountInfo>,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    owner: String,
}

pub fn account_info_request(address: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getAccountInfo",
        "params": [address, { "encoding": "base64" }],
    })
}

pub fn interpret_response(address: &str, body: &str) -> Result<ContractInfo, FetchError> {
    let network = Network::Solana;
    let response: RpcResponse =
        serde_json::from_str(body).map_err(|e| FetchError::UnknownApiFailure {
            network,
            message: format!("malformed RPC response: {e}"),
        })?;

    if let Some(error) = response.error {
        return Err(FetchError::UnknownApiFailure {
            network,
            message: format!("RPC error {}: {}", error.code, error.message),
        });
    }

    let account = response
        .result
        .and_then(|r| r.value)
        .ok_or_else(|| FetchError::UnknownApiFailure {
            network,
            message: format!("account {address} not found"),
        })?;

    let source_code = if account.owner == BPF_UPGRADEABLE_LOADER {
        format!(
            "// Solana BPF Program\n// Binary analysis not available - source code verification needed\n// Address: {address}"
        )
    } else {
        format!("// Solana Account\n// Address: {address}\n// Owner: {}", account.owner)
    };

    Ok(ContractInfo {
        address: address.to_string(),
        source_code,
        contract_name: "Solana Program".to_string(),
        compiler_version: "Unknown".to_string(),
        blockchain: network,
        is_verified: false,
        explorer_url: format!("{}{address}", network.explorer_url()),
        abi: None,
        constructor_args: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

    #[test]
    fn test_request_shape() {
        let req = account_info_request(ADDR);
        assert_eq!(req["method"], "getAccountInfo");
        assert_eq!(req["params"][0], ADDR);
        assert_eq!(req["params"][1]["encoding"], "base64");
    }

    #[test]
    fn test_bpf_program_placeholder() {
        let body = format!(
            r#"{{"jsonrpc":"2.0","id":1,"result":{{"context":{{"slot":1}},"value":{{"owner":"{BPF_UPGRADEABLE_LOADER}","lamports":1,"executable":true}}}}}}"#
        );
        let info = interpret_response(ADDR, &body).unwrap();
        assert!(!info.is_verified);
        assert!(info.source_code.contains("Binary analysis not available"));
        assert_eq!(info.contract_name, "Solana Program");
        assert_eq!(info.explorer_url, format!("https://explorer.solana.com/address/{ADDR}"));
    }

    #[test]
    fn test_plain_account_names_owner() {
        let body = r#"{"result":{"value":{"owner":"TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"}}}"#;
        let info = interpret_response(ADDR, body).unwrap();
        assert!(info.source_code.contains("// Owner: TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"));
    }

    #[test]
    fn test_missing_account() {
        let body = r#"{"result":{"context":{"slot":1},"value":null}}"#;
        assert!(matches!(
            interpret_response(ADDR, body),
            Err(FetchError::UnknownApiFailure { .. })
        ));
    }

    #[test]
    fn test_rpc_error() {
        let body = r#"{"error":{"code":-32602,"message":"Invalid param"}}"#;
        let err = interpret_response(ADDR, body).unwrap_err();
        assert!(err.to_string().contains("Invalid param"));
    }
}
