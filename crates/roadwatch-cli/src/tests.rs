use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["roadwatch-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["roadwatch-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_seed_without_path() {
    let cli = Cli::try_parse_from(["roadwatch-cli", "db", "seed"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { path: None }
        })
    ));
}

#[test]
fn parses_db_seed_with_path() {
    let cli = Cli::try_parse_from(["roadwatch-cli", "db", "seed", "--path", "net.yaml"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { path: Some(ref p) }
        }) if p == &PathBuf::from("net.yaml")
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["roadwatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_classify_score() {
    let cli = Cli::try_parse_from(["roadwatch-cli", "classify", "42.5"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Classify { score }) if (score - 42.5).abs() < f64::EPSILON
    ));
}

#[test]
fn match_defaults_tolerance_and_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "roadwatch-cli",
        "match",
        "--lng",
        "-43.2",
        "--lat",
        "-22.9",
        "--network",
        "config/network.yaml",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Match { lng, lat, tolerance, .. })
            if lng == -43.2 && lat == -22.9 && tolerance == 50.0
    ));
}

#[test]
fn match_requires_network() {
    assert!(Cli::try_parse_from(["roadwatch-cli", "match", "--lng", "0", "--lat", "0"]).is_err());
}

#[test]
fn classify_rejects_out_of_range_score() {
    assert!(offline::run_classify(150.0).is_err());
    assert!(offline::run_classify(25.0).is_ok());
}

#[test]
fn match_in_network_reports_named_overlaps() {
    let network = roadwatch_core::NetworkFile::from_yaml(
        r"
cities:
  - name: Grid
    center: [0.0, 0.0]
    roads:
      - name: Main
        coordinates: [[0.0, 0.0], [0.0, 0.001]]
      - coordinates: [[0.0001, 0.0], [0.0001, 0.001]]
      - name: Far
        coordinates: [[0.01, 0.0], [0.01, 0.001]]
",
    )
    .unwrap();
    let point = roadwatch_core::Point::new(0.00005, 0.0005).unwrap();

    let matches = offline::match_in_network(&network, point, 50.0);
    assert_eq!(matches, vec![(1, Some("Main")), (2, None)]);
}
