//! Well-known names shared by the resolver, indexer, and assembler.

/// Prefix of synthetic method names minted for exported functions.
pub const FUNCTION_PREFIX: &str = "@nodeapiFunction";

/// Prefix of synthetic file names, one per loaded module.
pub const FILE_PREFIX: &str = "@nodeapiFile";

/// Prefix of synthetic class names, one per loaded module.
pub const CLASS_PREFIX: &str = "@nodeapiClass";

/// The host-defined run-time loader whose string-literal argument names a
/// native library.
pub const DYNAMIC_LOADER: &str = "loadNativeModule";

/// Native binary suffix on import source paths.
pub const NATIVE_SUFFIX: &str = ".so";

/// Extract the library name from an import source path: `libentry.so` and
/// `libentry.so&tag` both yield `libentry`; anything else is not a native
/// import.
pub fn native_library_of(source: &str) -> Option<&str> {
    if let Some(stripped) = source.strip_suffix(NATIVE_SUFFIX) {
        return Some(stripped);
    }
    source
        .find(".so&")
        .map(|pos| &source[..pos])
}
