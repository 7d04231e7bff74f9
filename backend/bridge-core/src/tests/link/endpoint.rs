// Unit tests for endpoint validation

use crate::error::LinkError;
use crate::link::Endpoint;

#[test]
fn given_valid_host_and_port_when_building_then_formats_address() {
    // GIVEN/WHEN: A valid endpoint
    let endpoint = Endpoint::new("127.0.0.1", 6677).unwrap();

    // THEN: Accessors and address agree
    assert_eq!(endpoint.host(), "127.0.0.1");
    assert_eq!(endpoint.port(), 6677);
    assert_eq!(endpoint.address(), "127.0.0.1:6677");
    assert_eq!(endpoint.to_string(), "127.0.0.1:6677");
}

/// **VALUE**: Verifies that port 0 is rejected up front.
///
/// **BUG THIS CATCHES**: Would catch a monitor silently retrying forever against a
/// port that can never be connected to.
#[test]
fn given_port_zero_when_building_then_returns_endpoint_error() {
    let result = Endpoint::new("127.0.0.1", 0);

    assert!(
        matches!(result, Err(LinkError::Endpoint { .. })),
        "Port 0 should be rejected"
    );
}

#[test]
fn given_blank_host_when_building_then_returns_endpoint_error() {
    let result = Endpoint::new("   ", 6677);

    assert!(matches!(result, Err(LinkError::Endpoint { .. })));
}

#[test]
fn given_ipv6_host_when_formatting_address_then_brackets_it() {
    let endpoint = Endpoint::new("::1", 6677).unwrap();

    assert_eq!(endpoint.address(), "[::1]:6677");
}
