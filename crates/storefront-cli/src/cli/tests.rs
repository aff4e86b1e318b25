use super::*;
use clap::Parser;

#[test]
fn tree_parses_comma_separated_section_order() {
    let cli = Cli::try_parse_from([
        "storefront",
        "tree",
        "--type",
        "DI2E-SVCV4",
        "--section-order",
        "2,1,3",
    ])
    .expect("parse");
    match cli.command {
        Commands::Tree(TreeArgs {
            type_key,
            section_order,
        }) => {
            assert_eq!(type_key, "DI2E-SVCV4");
            assert_eq!(section_order, vec!["2", "1", "3"]);
        }
        _ => panic!("expected tree command"),
    }
}

#[test]
fn root_and_verbosity_flags_are_global() {
    let cli = Cli::try_parse_from(["storefront", "refresh", "--root", "/tmp/sf", "-v"])
        .expect("parse");
    assert_eq!(cli.root, PathBuf::from("/tmp/sf"));
    assert!(cli.verbose);
    assert!(!cli.quiet);
    assert!(matches!(cli.command, Commands::Refresh));
}

#[test]
fn root_defaults_to_local_state_directory() {
    let cli = Cli::try_parse_from(["storefront", "init"]).expect("parse");
    assert_eq!(cli.root, PathBuf::from(".storefront"));
}

#[test]
fn search_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["storefront", "search", "--query", "map"]).expect("parse");
    match cli.command {
        Commands::Search(SearchArgs { query, limit }) => {
            assert_eq!(query, "map");
            assert_eq!(limit, 20);
        }
        _ => panic!("expected search command"),
    }
}

#[test]
fn codes_requires_a_type() {
    let parsed = Cli::try_parse_from(["storefront", "codes"]);
    assert!(parsed.is_err(), "codes without --type must be rejected");
}

#[test]
fn score_requires_query_and_file() {
    assert!(Cli::try_parse_from(["storefront", "score", "--query", "x"]).is_err());
    let cli = Cli::try_parse_from(["storefront", "score", "--query", "x", "--file", "c.json"])
        .expect("parse");
    assert!(matches!(cli.command, Commands::Score(_)));
}

#[test]
fn failing_commands_name_their_operation_and_type() {
    let tree = Cli::try_parse_from(["storefront", "tree", "--type", "CATEGORY"]).expect("parse");
    assert_eq!(tree.command.operation(), "tree");
    assert_eq!(tree.command.type_key().as_deref(), Some("CATEGORY"));

    let sync = Cli::try_parse_from(["storefront", "sync", "--file", "batch.json"]).expect("parse");
    assert_eq!(sync.command.operation(), "sync");
    assert_eq!(sync.command.type_key(), None);
}
