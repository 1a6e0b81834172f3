//! Offline walkthrough of the rebind/push client surface.
//!
//! Runs a scripted login against an in-memory transport: the connection
//! sends a rebind request, the canned inbound stream acknowledges it, and
//! push is enabled afterwards.

use async_trait::async_trait;
use bytes::Bytes;
use p1_client::{
    ClientConfig, Connection, IqResponse, LoginPath, PushConfig, TokenRead, Transport,
    TransportError, XmlToken, XmlTokenReader,
};
use std::sync::{Arc, Mutex};

/// Canned inbound stream: the server acknowledges the rebind out of band.
const INBOUND: &[u8] = b"<stream:stream xmlns=\"jabber:client\" \
    xmlns:stream=\"http://etherx.jabber.org/streams\">\
    <rebind xmlns=\"p1:rebind\"/>";

/// Minimal in-memory transport that acknowledges every request.
#[derive(Default)]
struct LoopbackTransport {
    sent: Mutex<Vec<Bytes>>,
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send_request(&self, payload: Bytes) -> Result<IqResponse, TransportError> {
        println!("  -> request: {}", String::from_utf8_lossy(&payload));
        Ok(IqResponse::Result)
    }

    async fn send_element(&self, payload: Bytes) -> Result<(), TransportError> {
        println!("  -> element: {}", String::from_utf8_lossy(&payload));
        self.sent.lock().unwrap().push(payload);
        Ok(())
    }

    async fn write_raw(&self, bytes: &[u8]) -> Result<(), TransportError> {
        println!("  -> raw: {:?}", String::from_utf8_lossy(bytes));
        Ok(())
    }

    fn has_feature(&self, element: &str, namespace: &str) -> bool {
        element == "rebind" && namespace == "p1:rebind"
    }

    async fn authenticate(&self) -> Result<(), TransportError> {
        println!("  (full authentication would run here)");
        Ok(())
    }

    async fn after_login(&self, path: LoginPath) {
        println!("  post-login hook: {path:?}");
    }

    fn stream_id(&self) -> Option<String> {
        None
    }

    fn local_jid(&self) -> Option<String> {
        None
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    println!("=== Rebind + push walkthrough ===\n");

    let transport = Arc::new(LoopbackTransport::default());
    let connection = Connection::new(transport.clone(), ClientConfig::default());

    println!("1. Seeding resumption state from the previous session...");
    connection.set_rebind_state("user@example.com/mobile", "sid-1").await;

    println!("\n2. Pumping the inbound stream through the interceptor...");
    let mut reader = connection.wrap_reader(XmlTokenReader::new(INBOUND));
    let pump = {
        let transport = transport.clone();
        tokio::spawn(async move {
            // Wait for the rebind request to go out, then play the stream.
            while transport.sent.lock().unwrap().is_empty() {
                tokio::task::yield_now().await;
            }
            loop {
                match reader.next_token().await {
                    Ok(XmlToken::Eof) | Err(_) => break,
                    Ok(token) => println!("  <- token: {token:?}"),
                }
            }
        })
    };

    println!("\n3. Logging in (resume-or-authenticate)...");
    let path = connection.login().await?;
    pump.await?;
    println!("  logged in via {path:?}");

    println!("\n4. Enabling push with a device block...");
    let mut push = PushConfig::new(120, 60);
    push.device_type = Some("gcm".to_string());
    push.device_id = Some("registration-token".to_string());
    push.app_id = Some("example-app".to_string());
    connection.enable_push(&push).await?;
    println!("  push enabled: {}", connection.is_push_enabled().await);

    println!("\n5. Harvesting state to persist for the next rebind...");
    println!(
        "  jid={} sid={:?}",
        connection.rebind_jid().await,
        connection.rebind_sid().await
    );

    println!("\n=== Walkthrough completed ===");
    Ok(())
}
