//! Configure, derive and call a contract through the facade prelude.

use std::io::Write;
use std::sync::Arc;

use abi_call::prelude::*;

const VAULT_ABI: &str = r#"{
    "functions": [
        { "name": "deposit", "inputs": [ {"name": "to", "type": "Address"} ],
          "output": "u64", "attributes": ["payable"] },
        { "name": "fee", "output": "u64" },
        { "name": "paused", "output": "bool" }
    ],
    "configurables": [
        { "name": "FEE", "type": "u64", "offset": 8 },
        { "name": "PAUSED", "type": "bool", "offset": 16 }
    ]
}"#;

fn load_descriptor() -> anyhow::Result<Arc<InterfaceDescriptor>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(VAULT_ABI.as_bytes())?;
    Ok(Arc::new(InterfaceDescriptor::from_file(file.path())?))
}

fn configured_bytecode(descriptor: &InterfaceDescriptor) -> anyhow::Result<Bytecode> {
    let values = ConfigurableValues::new()
        .with("FEE", 25u64)
        .with("PAUSED", false);
    Ok(apply_configurables(
        Bytecode::new(vec![0xaa; 32]),
        &values,
        descriptor,
        &CanonicalCodec,
    )?)
}

#[tokio::test]
async fn test_deploy_configure_and_batch() -> anyhow::Result<()> {
    let descriptor = load_descriptor()?;
    let bytecode = configured_bytecode(&descriptor)?;
    assert_eq!(&bytecode.as_bytes()[8..16], &25u64.to_le_bytes());
    assert_eq!(bytecode.as_bytes()[16], 0);

    let salt = Bytes32::new([0x01; 32]);
    let id = derive_contract_id(bytecode.as_bytes(), &salt);

    let mut mock = MockProvider::new(LOCAL_CHAIN);
    mock.on_function(id, "fee()", |_| Ok(25u64.to_le_bytes().to_vec()))
        .on_function(id, "paused()", |_| Ok(vec![0]))
        .on_function(id, "deposit(Address)", |call| {
            Ok(call.amount.to_le_bytes().to_vec())
        });

    let vault = Contract::from_bytecode(&bytecode, &salt, descriptor)
        .with_provider(Arc::new(mock.clone()));
    assert_eq!(vault.id(), id);

    let asset = AssetId::new([0x0c; 32]);
    let deposit = vault
        .method("deposit", ArgumentInput::positional([Address::ZERO]))?
        .with_call_parameters(CallParameters::new(40, asset))?;

    let batch = MultiCallScope::new(vec![
        vault.method("fee", ArgumentInput::none())?,
        vault.method("paused", ArgumentInput::none())?,
        deposit,
    ])?;

    let response = batch.call().await?;
    assert_eq!(
        response.values,
        vec![Token::U64(25), Token::Bool(false), Token::U64(40)]
    );
    assert!(response.tx_id.is_some());
    assert!(response.gas_used > 0);

    let submitted = mock.submitted_requests();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0], batch.to_transaction_request()?);
    Ok(())
}

#[test]
fn test_request_survives_json() -> anyhow::Result<()> {
    let descriptor = load_descriptor()?;
    let vault = Contract::new(ContractId::new([0x77; 32]), descriptor);
    let request = vault
        .method("fee", ArgumentInput::none())?
        .with_tx_policies(TxPolicies::default().with_tip(3))
        .to_transaction_request()?;

    let json = serde_json::to_string(&request)?;
    let decoded: TransactionRequest = serde_json::from_str(&json)?;
    assert_eq!(decoded, request);
    Ok(())
}

#[test]
fn test_non_payable_rejects_amount() -> anyhow::Result<()> {
    let descriptor = load_descriptor()?;
    let vault = Contract::new(ContractId::new([0x77; 32]), descriptor);
    let err = vault
        .method("fee", ArgumentInput::none())?
        .with_call_parameters(CallParameters::new(1, AssetId::ZERO))
        .unwrap_err();
    assert_eq!(err.kind(), "NonPayable");
    Ok(())
}

const LOCAL_CHAIN: ChainId = ChainId(1337);
