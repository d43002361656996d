use super::*;

#[test]
fn flags_override_settings() {
    let args = Args::parse_from([
        "trainlist",
        "sim.example",
        "--port",
        "16000",
        "--sort",
        "speed",
        "--descending",
        "--hide",
        "120",
        "--hide",
        "250",
        "--hide-unknown",
    ]);
    let mut settings = ClientSettings::default();
    args.apply(&mut settings);

    assert_eq!(settings.host, "sim.example");
    assert_eq!(settings.port, 16000);
    assert_eq!(settings.sort_column, Column::Speed);
    assert!(settings.sort_descending);
    assert_eq!(
        settings.disabled_territories,
        vec![TerritoryId(120), TerritoryId(250)]
    );
    assert!(!settings.show_unknown_territories);
}

#[test]
fn localhost_conflicts_with_host() {
    assert!(Args::try_parse_from(["trainlist", "sim.example", "--localhost"]).is_err());

    let args = Args::parse_from(["trainlist", "--localhost"]);
    let mut settings = ClientSettings {
        host: "elsewhere".to_string(),
        ..ClientSettings::default()
    };
    args.apply(&mut settings);
    assert_eq!(settings.host, "localhost");
}

#[test]
fn no_flags_keep_settings() {
    let args = Args::parse_from(["trainlist"]);
    let mut settings = ClientSettings::default();
    let before = settings.clone();
    args.apply(&mut settings);
    assert_eq!(settings, before);
}
