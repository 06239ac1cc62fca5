#![allow(dead_code)]

mod mock;
mod trace;

use std::sync::Arc;

use kubeclient::{Client, JsonCodec, Registry};
pub use mock::{MockTransport, RecordedRequest};
pub use trace::trace_init;

pub const ENDPOINT: &str = "https://example.com";

/// A registry with every built-in resource.
pub fn registry() -> Arc<Registry> {
    let registry = Registry::new();
    kubeclient::resource::register_builtin(&registry).unwrap();
    Arc::new(registry)
}

/// A client talking to `transport`, the handle shares its queue and
/// request log with the one inside the client.
pub fn client() -> (Client<MockTransport>, MockTransport) {
    let transport = MockTransport::default();
    let client = Client::new(ENDPOINT, registry(), transport.clone(), JsonCodec);

    (client, transport)
}
