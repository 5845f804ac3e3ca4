//! Loading interface descriptors from ABI documents on disk.

use std::io::Write;

use abi_call_types::AbiError;
use abi_interface::{InterfaceDescriptor, ParamType};

const PREDICATE_ABI: &str = r#"{
    "encoding_version": "1",
    "functions": [
        { "name": "main",
          "inputs": [ {"name": "signature", "type": "b256"}, {"name": "nonce", "type": "u32"} ],
          "output": "bool" }
    ],
    "configurables": [
        { "name": "OWNER", "type": "Address", "offset": 96 },
        { "name": "THRESHOLD", "type": "u64", "offset": 128 },
        { "name": "LIMITS", "type": "[u16; 4]", "offset": 136 }
    ]
}"#;

#[test]
fn test_load_descriptor_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PREDICATE_ABI.as_bytes()).unwrap();

    let descriptor = InterfaceDescriptor::from_file(file.path()).unwrap();

    let main = descriptor.get_function("main").unwrap();
    assert_eq!(main.signature(), "main(b256,u32)");
    assert_eq!(main.output, ParamType::Bool);

    let names: Vec<&str> = descriptor.configurables().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["LIMITS", "OWNER", "THRESHOLD"]);

    let limits = descriptor.get_configurable("LIMITS").unwrap();
    assert_eq!(limits.width, 8);
    assert_eq!(limits.range(), 136..144);
}

#[test]
fn test_missing_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let err = InterfaceDescriptor::from_file(dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.kind(), "MalformedAbi");
}

#[test]
fn test_descriptor_is_shareable_across_threads() {
    let descriptor = std::sync::Arc::new(InterfaceDescriptor::from_json(PREDICATE_ABI).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let descriptor = descriptor.clone();
            std::thread::spawn(move || descriptor.get_function("main").map(|f| f.params.len()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(2));
    }
    assert!(matches!(
        descriptor.get_function("spend"),
        Err(AbiError::UnknownFunction { .. })
    ));
}
