//! CLI command definitions using `clap`

use clap::{Arg, Command as ClapCommand};

pub fn after_help_text(examples: &[&str]) -> String {
    let mut text = String::from("EXAMPLES:\n");
    for example in examples {
        text.push_str("  ");
        text.push_str(example);
        text.push('\n');
    }
    text
}

pub fn cmd_watch() -> ClapCommand {
    ClapCommand::new("watch")
        .about("Watch a directory tree and sync ready subtrees to the configured backends")
        .long_about(
            "Watches DIR recursively. When a subtree is marked ready by creating a \
             .bowser.ready file inside it, the subtree is uploaded to every configured \
             backend. The watch ends when the stop strategy is satisfied, the abort \
             marker is created, or the process is interrupted.",
        )
        .after_help(after_help_text(&[
            "bowser watch /srv/drops                       Watch until .bowser.complete appears",
            "bowser watch /srv/drops --strategy count --count 3",
            "                                              Stop after three ready subtrees",
            "bowser watch /srv/drops --abort-marker /tmp/stop-now",
            "                                              Use a custom abort marker path",
            "bowser --debug watch /srv/drops --dry-run     Full protocol against an in-memory store",
        ]))
        .arg(
            Arg::new("dir")
                .required(true)
                .value_name("DIR")
                .help("Root directory to watch"),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .value_name("STRATEGY")
                .value_parser(["sentinel", "count"])
                .default_value("sentinel")
                .help("When to stop: a .bowser.complete sentinel, or a fixed count"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .value_name("N")
                .value_parser(clap::value_parser!(u32))
                .help("Number of ready subtrees to process (required with --strategy count)"),
        )
        .arg(
            Arg::new("abort-marker")
                .long("abort-marker")
                .value_name("PATH")
                .help("Abort marker path (default: <DIR>/.bowser.abort)"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(clap::ArgAction::SetTrue)
                .help("Run the full upload protocol against an in-memory store"),
        )
}

pub fn build_cli() -> ClapCommand {
    ClapCommand::new("bowser")
        .about("Sync directory subtrees to remote storage when they are marked ready")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(cmd_watch())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_tree_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_watch_defaults() {
        let matches = build_cli()
            .try_get_matches_from(["bowser", "watch", "/srv/drops"])
            .ok();
        let Some(matches) = matches else {
            panic!("watch with a directory should parse");
        };
        let Some(watch) = matches.subcommand_matches("watch") else {
            panic!("watch subcommand expected");
        };
        assert_eq!(
            watch.get_one::<String>("strategy").map(String::as_str),
            Some("sentinel")
        );
        assert!(!watch.get_flag("dry-run"));
    }

    #[test]
    fn test_watch_rejects_unknown_strategy() {
        assert!(build_cli()
            .try_get_matches_from(["bowser", "watch", "/srv/drops", "--strategy", "random"])
            .is_err());
    }

    #[test]
    fn test_debug_flag_is_global() {
        let matches = build_cli()
            .try_get_matches_from(["bowser", "watch", "/srv/drops", "--debug"])
            .ok();
        let Some(matches) = matches else {
            panic!("global --debug after subcommand should parse");
        };
        assert!(matches.get_flag("debug"));
    }
}
