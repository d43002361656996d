use super::*;

#[test]
fn endpoint_targets_the_dispatcher_service() {
    let url = ServiceEndpoint::for_host("sim.example").url().expect("url");
    assert_eq!(url.as_str(), "ws://sim.example:15192/Run8");
}

#[test]
fn endpoint_accepts_ip_addresses_and_custom_ports() {
    let endpoint = ServiceEndpoint {
        port: 4000,
        ..ServiceEndpoint::for_host(" 192.168.1.20 ")
    };
    assert_eq!(
        endpoint.url().expect("url").as_str(),
        "ws://192.168.1.20:4000/Run8"
    );
}

#[test]
fn endpoint_brackets_ipv6_literals() {
    for host in ["::1", "[::1]"] {
        let url = ServiceEndpoint::for_host(host).url().expect("url");
        assert_eq!(url.as_str(), "ws://[::1]:15192/Run8");
    }
}

#[test]
fn empty_host_is_a_connect_error() {
    let err = ServiceEndpoint::for_host("  ").url().expect_err("empty host");
    assert!(matches!(err, SessionError::Connect { .. }));
}
