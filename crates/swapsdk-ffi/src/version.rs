//! ABI contract verification
//!
//! The generated bindings are compiled against one specific native build: a
//! contract version plus a checksum per entry point, both baked in at
//! generation time. On startup the native library is probed and every value
//! compared; any skew means the glue and the library were built from
//! different definitions, and continuing would corrupt calls in ways no
//! caller can detect. Mismatches therefore abort initialization outright.

/// Compiled-in expectations for one native build.
#[derive(Debug, Clone, Copy)]
pub struct ApiContract {
    /// Version of the serialization/calling contract itself.
    pub contract_version: u32,
    /// `(entry point symbol, expected checksum)` pairs.
    pub checksums: &'static [(&'static str, u16)],
}

impl ApiContract {
    /// Verify the native build against the compiled-in expectations.
    ///
    /// `actual_version` comes from the library's version entry point;
    /// `probe` invokes the per-symbol checksum entry points. Panics on the
    /// first mismatch: this is a fatal startup fault, not a recoverable
    /// condition, and no native call may proceed past it.
    pub fn verify(&self, actual_version: u32, probe: impl Fn(&str) -> u16) {
        if actual_version != self.contract_version {
            panic!(
                "native contract version mismatch: bindings expect {}, library reports {}",
                self.contract_version, actual_version
            );
        }
        for (symbol, expected) in self.checksums {
            let actual = probe(symbol);
            if actual != *expected {
                panic!(
                    "checksum mismatch for native entry point '{symbol}': \
                     bindings expect {expected:#06x}, library reports {actual:#06x}"
                );
            }
        }
        tracing::debug!(
            version = self.contract_version,
            entry_points = self.checksums.len(),
            "native ABI contract verified"
        );
    }
}
