use std::{env, process};

use clap::ArgAction;
use cmdtree::{exitcode, BuildResult, CommandOutline, CommandTree, NodeMut};
use colored::Colorize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    setup_logging(debug_level(&args));

    let mut say = match build() {
        Ok(say) => say,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(exitcode::SOFTWARE);
        }
    };

    let code = match say.must_parse(args) {
        Ok(_) => exitcode::OK,
        Err(e) => e.exit_code(),
    };
    process::exit(code);
}

fn build() -> BuildResult<CommandTree> {
    let mut say = CommandTree::new("say", "Say things in several languages");
    say.version(env!("CARGO_PKG_VERSION"));
    say.flag_with("debug", "Increase log verbosity (-d, -dd, -ddd)", |a| {
        a.short('d').action(ArgAction::Count)
    })?;
    say.command("en", "Say it in english")?
        .mark_default()?
        .configure(greeting("Hello"));
    say.command("fr", "Say it in french")?
        .alias("francais")?
        .configure(greeting("Bonjour"));
    say.command("tree", "Print the command tree")?;
    let outline = say.to_tree_string().to_string();
    if let Some(mut tree) = say.root_mut().child("tree") {
        tree.run(move || {
            print!("{outline}");
            Ok(())
        });
    }
    say.example("say en world", "Greet the world in english");
    say.example("say fr --loud monde", "Shout at the world in french");
    Ok(say)
}

/// Words, a `--loud` switch and an action printing the greeting.
fn greeting(word: &'static str) -> impl FnOnce(&mut NodeMut<'_>) {
    move |node| {
        let (Ok(loud), Ok(name)) = (
            node.flag_with("loud", "Shout it", |a| a.short('l').action(ArgAction::SetTrue)),
            node.arg_with("name", "Who to greet", |a| a.default_value("world")),
        ) else {
            tracing::warn!(command = %node.node().name(), "greeting already configured");
            return;
        };
        node.run(move || {
            let line = format!("{word}, {}!", name.get().unwrap_or_default());
            if loud.parse::<bool>() == Some(Ok(true)) {
                println!("{}", line.to_uppercase().bold());
            } else {
                println!("{line}");
            }
            Ok(())
        });
    }
}

/// Logging has to be up before the tree parses, so `-d` is counted by hand.
fn debug_level(args: &[String]) -> u8 {
    args.iter()
        .take_while(|a| a.as_str() != "--")
        .filter(|a| a.starts_with('-') && !a.starts_with("--"))
        .map(|a| a.chars().skip(1).filter(|&c| c == 'd').count() as u8)
        .sum::<u8>()
        + args.iter().filter(|a| a.as_str() == "--debug").count() as u8
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdtree::util::testing;

    #[test]
    fn verify_cli() {
        testing::init_test_setup();
        let say = build().unwrap();
        let outline = say.to_tree_string().to_string();
        assert!(outline.contains("en [default]"));
        assert!(outline.contains("fr (francais)"));
        assert!(outline.contains("tree"));
    }

    #[test]
    fn given_debug_flag_after_command_when_parsed_then_accepted() {
        testing::init_test_setup();
        let mut say = build().unwrap().writer(Vec::new());
        let outcome = say.parse(["fr", "-d", "monde"]).unwrap();
        assert_eq!(
            outcome,
            cmdtree::Outcome::Completed {
                path: vec!["say".into(), "fr".into()]
            }
        );
    }

    #[test]
    fn given_repeated_short_flags_when_counting_then_sums_levels() {
        let args: Vec<String> = ["-dd", "--debug", "en", "--", "-d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(debug_level(&args), 3);
    }
}
