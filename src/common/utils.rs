//! Utility functions for cluster-peers

use serde_json::Value;
use std::net::{IpAddr, UdpSocket};

/// Decode an attribute value received from a peer.
///
/// Values published through the JSON path are JSON documents; raw values
/// (addresses) are plain text and come back as a JSON string.
pub fn decode_attribute(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Text form of a value handed over by the host: strings verbatim,
/// anything else as JSON
pub fn attribute_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Truthiness of a decoded attribute: `null`, `false`, zero and empty
/// strings/collections are all falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Address of the interface carrying the default route.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
pub fn local_route_address() -> crate::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket
        .connect("192.0.2.1:9")
        .map_err(|e| crate::Error::AddressResolution(format!("no route: {}", e)))?;
    let addr = socket.local_addr()?.ip();
    if addr.is_unspecified() {
        return Err(crate::Error::AddressResolution(
            "local route has no address".into(),
        ));
    }
    Ok(addr)
}

/// Mask a secret for logs and CLI output
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
