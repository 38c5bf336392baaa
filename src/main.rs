//! Multi-site CMS - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    multisite_cms::run().await;
}
