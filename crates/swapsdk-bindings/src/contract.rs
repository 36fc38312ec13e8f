//! Compiled-in ABI contract for the native build these bindings target
//!
//! Regenerated together with the schema layer whenever the native library's
//! interface definition changes. [`verify`] must run before any other entry
//! point; a mismatch aborts startup.

use swapsdk_ffi::loader::{LoadError, NativeLibrary};
use swapsdk_ffi::version::ApiContract;

/// Version of the serialization/calling contract these bindings implement.
pub const CONTRACT_VERSION: u32 = 26;

/// Checksums of every entry point, baked in at generation time.
pub const ENTRY_POINT_CHECKSUMS: &[(&str, u16)] = &[
    ("swapsdk_fn_connect", 0x9f3a),
    ("swapsdk_fn_disconnect", 0x1c42),
    ("swapsdk_fn_prepare_receive", 0x5be7),
    ("swapsdk_fn_receive_payment", 0x70d1),
    ("swapsdk_fn_send_payment", 0x22ad),
    ("swapsdk_fn_list_payments", 0xe06c),
    ("swapsdk_fn_add_event_listener", 0x48f5),
    ("swapsdk_fn_set_signer", 0xb319),
];

/// Symbol reporting the library's contract version.
pub const VERSION_SYMBOL: &str = "swapsdk_contract_version";

/// Prefix of the per-entry-point checksum symbols.
pub const CHECKSUM_SYMBOL_PREFIX: &str = "swapsdk_checksum_";

pub fn api_contract() -> ApiContract {
    ApiContract {
        contract_version: CONTRACT_VERSION,
        checksums: ENTRY_POINT_CHECKSUMS,
    }
}

/// Probe a loaded library and verify it against the compiled-in contract.
/// Aborts (panics) on any mismatch; returns `Err` only if the probe symbols
/// themselves are missing, which is the same ABI-skew condition surfaced
/// before the comparison could run.
pub fn verify(library: &NativeLibrary) -> Result<(), LoadError> {
    let actual_version = unsafe {
        let version_fn = library.get::<unsafe extern "C" fn() -> u32>(VERSION_SYMBOL)?;
        version_fn()
    };
    api_contract().verify(actual_version, |entry_point| unsafe {
        let symbol = format!("{CHECKSUM_SYMBOL_PREFIX}{entry_point}");
        match library.get::<unsafe extern "C" fn() -> u16>(&symbol) {
            Ok(checksum_fn) => checksum_fn(),
            Err(_) => panic!("native library is missing checksum entry point '{symbol}'"),
        }
    });
    Ok(())
}
