use super::*;

#[test]
fn rust_log_overrides_the_default_filter() {
    std::env::set_var("RUST_LOG", "feed_server=debug");
    assert_eq!(log_filter("info").to_string(), "feed_server=debug");

    std::env::remove_var("RUST_LOG");
    assert_eq!(log_filter("info").to_string(), "info");
}

#[test]
fn permission_flag_maps_to_the_announced_level() {
    let cli = Cli::parse_from(["feed-server", "--permission", "observer"]);
    let announced = DispatcherPermission::from(cli.permission);
    assert_eq!(announced.permission, PermissionLevel::Observer);
    assert!(!announced.ai_permission);

    let cli = Cli::parse_from(["feed-server"]);
    assert_eq!(cli.permission, Permission::Granted);
    assert_eq!(cli.interval_ms, 500);
    assert_eq!(cli.bind, "127.0.0.1:15192".parse::<SocketAddr>().expect("addr"));
}
