//! The `export_extension!` macro.

/// Export an extension type through the Greet extension ABI.
///
/// Generates the two symbols the host resolves:
/// - `greet_extension_abi_version() -> u32`
/// - `greet_extension_descriptor() -> *const CExtensionDescriptor`
///
/// The descriptor carries the create and destroy entry points. The create
/// path parses the host-supplied JSON configuration and calls
/// `$ty::from_config`, which must have the signature
/// `fn from_config(config: &serde_json::Value) -> Result<Self, ExtensionError>`.
///
/// # Example
///
/// ```rust,ignore
/// use greet_extension_sdk::prelude::*;
///
/// struct MyExtension { /* ... */ }
///
/// impl MyExtension {
///     fn from_config(_config: &serde_json::Value) -> Result<Self, ExtensionError> {
///         Ok(MyExtension { /* ... */ })
///     }
/// }
///
/// export_extension!(
///     MyExtension,
///     id: "com.example.my-extension",
///     name: "My Extension",
///     version: "1.0.0",
///     description: "An example extension",
///     author: "Example Author",
/// );
/// ```
#[macro_export]
macro_rules! export_extension {
    (
        $ty:ty,
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr $(,)?
    ) => {
        #[doc(hidden)]
        unsafe extern "C" fn __greet_extension_create(
            config_json: *const u8,
            config_len: usize,
        ) -> *mut () {
            $crate::instantiate(config_json, config_len, <$ty>::from_config)
        }

        #[doc(hidden)]
        unsafe extern "C" fn __greet_extension_destroy(instance: *mut ()) {
            $crate::teardown(instance)
        }

        #[doc(hidden)]
        static __GREET_EXTENSION_DESCRIPTOR: $crate::descriptor::CExtensionDescriptor =
            $crate::descriptor::CExtensionDescriptor {
                abi_version: $crate::descriptor::GREET_EXTENSION_ABI_VERSION,
                id: $id.as_ptr(),
                id_len: $id.len(),
                name: $name.as_ptr(),
                name_len: $name.len(),
                version: $version.as_ptr(),
                version_len: $version.len(),
                description: $desc.as_ptr(),
                description_len: $desc.len(),
                author: $author.as_ptr(),
                author_len: $author.len(),
                create_fn: __greet_extension_create,
                destroy_fn: __greet_extension_destroy,
            };

        /// ABI version export, checked by the host before anything else.
        #[no_mangle]
        pub extern "C" fn greet_extension_abi_version() -> u32 {
            $crate::descriptor::GREET_EXTENSION_ABI_VERSION
        }

        /// Descriptor export. The returned pointer refers to static data
        /// and stays valid while the library is loaded.
        #[no_mangle]
        pub extern "C" fn greet_extension_descriptor(
        ) -> *const $crate::descriptor::CExtensionDescriptor {
            &__GREET_EXTENSION_DESCRIPTOR
        }
    };
}
