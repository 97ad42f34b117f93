//! The C-compatible descriptor exported by every extension library.
//!
//! The descriptor is the contract between an extension dylib and the host:
//! a `#[repr(C)]` struct of pointer/length string fields plus the create
//! and destroy entry points. Extensions export it through the function
//! generated by [`export_extension!`](crate::export_extension); the host
//! resolves that function with `libloading` and decodes the struct into
//! [`ExtensionMetadata`].

use crate::types::{ExtensionError, ExtensionMetadata, Result};

/// Extension ABI version.
///
/// Incremented when breaking changes are made to the descriptor layout or
/// the create/destroy calling convention.
pub const GREET_EXTENSION_ABI_VERSION: u32 = 1;

/// Create entry point: receives a UTF-8 JSON configuration document and
/// returns an opaque instance pointer, or null on failure.
pub type CreateFn = unsafe extern "C" fn(config_json: *const u8, config_len: usize) -> *mut ();

/// Destroy entry point: tears down an instance produced by [`CreateFn`].
pub type DestroyFn = unsafe extern "C" fn(instance: *mut ());

/// C-compatible extension descriptor.
///
/// String fields point at static data inside the extension library and
/// remain valid for as long as the library stays loaded.
#[repr(C)]
pub struct CExtensionDescriptor {
    /// ABI version, must equal [`GREET_EXTENSION_ABI_VERSION`]
    pub abi_version: u32,
    pub id: *const u8,
    pub id_len: usize,
    pub name: *const u8,
    pub name_len: usize,
    pub version: *const u8,
    pub version_len: usize,
    pub description: *const u8,
    pub description_len: usize,
    pub author: *const u8,
    pub author_len: usize,
    pub create_fn: CreateFn,
    pub destroy_fn: DestroyFn,
}

// The string fields point at immutable static data and the fn pointers are
// plain code addresses, so sharing the descriptor across threads is sound.
unsafe impl Sync for CExtensionDescriptor {}

impl CExtensionDescriptor {
    /// Decode the descriptor's string fields into [`ExtensionMetadata`].
    ///
    /// # Safety
    /// The pointer/length pairs must reference valid memory, which holds
    /// for any descriptor produced by `export_extension!` while its
    /// library remains loaded.
    pub unsafe fn decode(&self) -> Result<ExtensionMetadata> {
        let id = read_str(self.id, self.id_len, "id")?
            .ok_or_else(|| ExtensionError::InvalidFormat("descriptor has no id".to_string()))?;
        let name = read_str(self.name, self.name_len, "name")?.unwrap_or_else(|| id.clone());
        let version = read_str(self.version, self.version_len, "version")?
            .ok_or_else(|| ExtensionError::InvalidFormat("descriptor has no version".to_string()))?;
        let version: semver::Version = version
            .parse()
            .map_err(|e| ExtensionError::InvalidFormat(format!("invalid version: {e}")))?;

        let mut metadata = ExtensionMetadata::new(id, name, version);
        if let Some(description) = read_str(self.description, self.description_len, "description")? {
            metadata = metadata.with_description(description);
        }
        if let Some(author) = read_str(self.author, self.author_len, "author")? {
            metadata = metadata.with_author(author);
        }
        Ok(metadata)
    }
}

/// Read a pointer/length pair as an owned string. Null or empty fields
/// decode to `None`.
unsafe fn read_str(ptr: *const u8, len: usize, field: &str) -> Result<Option<String>> {
    if ptr.is_null() || len == 0 {
        return Ok(None);
    }
    let bytes = std::slice::from_raw_parts(ptr, len);
    let s = std::str::from_utf8(bytes)
        .map_err(|e| ExtensionError::InvalidFormat(format!("descriptor {field} is not UTF-8: {e}")))?;
    Ok(Some(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn noop_create(_config_json: *const u8, _config_len: usize) -> *mut () {
        std::ptr::null_mut()
    }

    unsafe extern "C" fn noop_destroy(_instance: *mut ()) {}

    fn descriptor() -> CExtensionDescriptor {
        CExtensionDescriptor {
            abi_version: GREET_EXTENSION_ABI_VERSION,
            id: "test.ext".as_ptr(),
            id_len: "test.ext".len(),
            name: "Test Extension".as_ptr(),
            name_len: "Test Extension".len(),
            version: "1.2.3".as_ptr(),
            version_len: "1.2.3".len(),
            description: std::ptr::null(),
            description_len: 0,
            author: "Someone".as_ptr(),
            author_len: "Someone".len(),
            create_fn: noop_create,
            destroy_fn: noop_destroy,
        }
    }

    #[test]
    fn test_decode() {
        let metadata = unsafe { descriptor().decode() }.unwrap();
        assert_eq!(metadata.id, "test.ext");
        assert_eq!(metadata.name, "Test Extension");
        assert_eq!(metadata.version, semver::Version::new(1, 2, 3));
        assert_eq!(metadata.description, None);
        assert_eq!(metadata.author, Some("Someone".to_string()));
    }

    #[test]
    fn test_decode_rejects_bad_version() {
        let mut desc = descriptor();
        desc.version = "not-a-version".as_ptr();
        desc.version_len = "not-a-version".len();

        let err = unsafe { desc.decode() }.unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidFormat(_)));
    }

    #[test]
    fn test_decode_requires_id() {
        let mut desc = descriptor();
        desc.id = std::ptr::null();
        desc.id_len = 0;

        assert!(unsafe { desc.decode() }.is_err());
    }
}
