//! The configuration for the dump tool, given from environment variables and lazy
//! initialized when needed.

use once_cell::race::OnceBool;
use std::env;


/// Return true if the binary NBT payload should be printed in hexadecimal after the
/// tag tree.
///
/// To enable this feature, set `LIMBO_META_HEX=1`.
pub fn hex_dump() -> bool {
    static ENV: OnceBool = OnceBool::new();
    ENV.get_or_init(|| {
        env::var_os("LIMBO_META_HEX")
            .map(|s| s.as_encoded_bytes() == b"1")
            .unwrap_or(false)
    })
}
