//! Load the greeting extension and greet a name.
//!
//! Build the extension first, then run:
//!
//! ```text
//! cargo build -p greet-hello-extension
//! cargo run -p greet-host --example greet -- target/debug/libgreet_extension_hello.so world
//! ```

use greet_host::ExtensionRegistry;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: greet <path-to-extension> [name]")?;
    let name = args.next().unwrap_or_else(|| "world".to_string());

    let registry = ExtensionRegistry::new();
    let metadata = registry.load_from_path(path.as_ref()).await?;

    let greeting = registry
        .execute_command(&metadata.id, "hello", &json!({ "name": name }))
        .await?;

    println!("{}", greeting.as_str().unwrap_or_default());
    Ok(())
}
