use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["locscrape"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_extract_with_defaults() {
    let cli = Cli::try_parse_from(["locscrape", "extract", "https://example.com/stores"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Extract {
            ref urls,
            format: OutputFormat::Json,
            output: None,
        }) if urls == &["https://example.com/stores"]
    ));
}

#[test]
fn parses_extract_multiple_urls_as_csv_to_file() {
    let cli = Cli::try_parse_from([
        "locscrape",
        "extract",
        "https://a.example.com",
        "https://b.example.com",
        "--format",
        "csv",
        "-o",
        "out.csv",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Extract {
            ref urls,
            format: OutputFormat::Csv,
            output: Some(ref path),
        }) if urls.len() == 2 && path == &PathBuf::from("out.csv")
    ));
}

#[test]
fn extract_requires_a_url() {
    assert!(Cli::try_parse_from(["locscrape", "extract"]).is_err());
}

#[test]
fn rejects_unknown_format() {
    assert!(Cli::try_parse_from(["locscrape", "parse", "page.html", "--format", "xml"]).is_err());
}

#[test]
fn parses_parse_command() {
    let cli = Cli::try_parse_from(["locscrape", "parse", "page.html", "--format", "csv"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Parse {
            ref file,
            format: OutputFormat::Csv,
            output: None,
        }) if file == &PathBuf::from("page.html")
    ));
}

#[test]
fn parses_candidates_command() {
    let cli = Cli::try_parse_from(["locscrape", "candidates", "page.html"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Candidates { ref file }) if file == &PathBuf::from("page.html")
    ));
}
