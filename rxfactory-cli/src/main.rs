use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rxfactory::{Config, Factory, Pattern, Report, Result, digit, whitespace, word};

#[derive(Parser)]
#[command(name = "rxfactory")]
#[command(about = "RxFactory - build regular expressions from composable pieces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Escape literal text into a pattern
    Escape {
        /// The literal text
        literal: String,
        /// Show how the pattern was built
        #[arg(short, long)]
        debug: bool,
    },
    /// Build a character set from the given characters
    Set {
        /// Characters to include (or exclude with --negate)
        chars: String,
        /// Match any character not in the set
        #[arg(short, long)]
        negate: bool,
        /// Optional input to search
        input: Option<String>,
    },
    /// Build a character range
    Range {
        /// First character of the range
        start: char,
        /// Last character of the range
        stop: char,
        /// Optional input to search
        input: Option<String>,
    },
    /// Find all matches of a raw pattern in input
    Find {
        /// The regex pattern
        pattern: String,
        /// The input string
        input: String,
        /// Treat the pattern as literal text
        #[arg(short, long)]
        literal: bool,
    },
    /// Build and run one of the bundled demo patterns
    Demo {
        /// Which demo to run
        #[arg(value_enum)]
        name: Demo,
        /// Input to search instead of the bundled sentence
        input: Option<String>,
        /// Show how the pattern was built
        #[arg(short, long)]
        debug: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Demo {
    /// Six-digit hex colour codes with an optional '#'
    HexCodes,
    /// Runs of two or three capital letters
    Initials,
    /// URLs with protocol, host, port and path
    Urls,
}

impl Demo {
    fn sentence(self) -> &'static str {
        match self {
            Demo::HexCodes => {
                "My favorite color is #000000. I also like 5fb8a0. My second favorite color is #FF21FF."
            }
            Demo::Initials => "My initials are BDP. Valorie's are VO",
            Demo::Urls => "This is a cool url, https://github.com/GrandMoff100/RegexFactory/ ",
        }
    }

    fn build(self, f: &Factory) -> Result<Pattern> {
        match self {
            Demo::HexCodes => {
                let lower = f.set([f.range('0', '9')?, f.range('a', 'f')?])?;
                let upper = f.set([f.range('0', '9')?, f.range('A', 'F')?])?;
                let code = f.alt(&[&f.exactly(&lower, 6), &f.exactly(&upper, 6)]);
                Ok(f.concat(&[&f.optional(&f.escape("#"), true), &code]))
            }
            Demo::Initials => {
                let capital = f.range('A', 'Z')?;
                f.amount(&capital, 2, Some(3))
            }
            Demo::Urls => {
                let lower = f.range('a', 'z')?;
                let protocol = f.multi(&lower, false, true);
                let host_char = f.set([word(), digit(), f.set(['.'])?])?;
                let host = f.multi(&host_char, false, true);
                let port = f.optional(
                    &f.group(&f.concat(&[&f.escape(":"), &f.multi(&digit(), false, true)])),
                    true,
                );
                let segment = f.not_set([
                    f.set(['/', '#', '?', '&'])?,
                    whitespace(),
                ])?;
                let path = f.multi(
                    &f.group(&f.concat(&[
                        &f.escape("/"),
                        &f.group(&f.multi(&segment, true, true)),
                    ])),
                    true,
                    true,
                );
                Ok(f.concat(&[&protocol, &f.escape("://"), &host, &port, &path]))
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Escape { literal, debug } => cmd_escape(&literal, debug),
        Commands::Set {
            chars,
            negate,
            input,
        } => cmd_set(&chars, negate, input.as_deref()),
        Commands::Range { start, stop, input } => cmd_range(start, stop, input.as_deref()),
        Commands::Find {
            pattern,
            input,
            literal,
        } => cmd_find(&pattern, &input, literal),
        Commands::Demo { name, input, debug } => cmd_demo(name, input.as_deref(), debug),
    };

    if let Err(e) = outcome {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn factory(debug: bool) -> Factory {
    if debug {
        Factory::new(Config::debug())
    } else {
        Factory::default()
    }
}

fn print_pattern(pattern: &Pattern, debug: bool) {
    if debug {
        Report::of(pattern).report();
        println!();
    } else {
        println!("{}", "Pattern:".bold());
        println!("  {}", pattern.source().cyan());
    }
}

fn print_matches(pattern: &Pattern, input: &str) -> Result<()> {
    println!("  Input:   {}", input.yellow());
    let matches = pattern.find_all(input)?;

    if matches.is_empty() {
        println!("{}", "No matches found".red());
        return Ok(());
    }

    println!(
        "{} {}",
        "Found".bold(),
        format!("{} match(es)", matches.len()).green()
    );
    println!();

    for (i, m) in matches.iter().enumerate() {
        println!(
            "  [{}] {}..{} = {}",
            i + 1,
            m.start,
            m.end,
            m.as_str(input).green()
        );
    }
    Ok(())
}

fn cmd_escape(literal: &str, debug: bool) -> Result<()> {
    let pattern = factory(debug).escape(literal);
    print_pattern(&pattern, debug);
    Ok(())
}

fn cmd_set(chars: &str, negate: bool, input: Option<&str>) -> Result<()> {
    let f = Factory::default();
    let members: Vec<char> = chars.chars().collect();
    let set = if negate {
        f.not_set(members)?
    } else {
        f.set(members)?
    };
    print_pattern(&set, false);
    if let Some(input) = input {
        print_matches(&set, input)?;
    }
    Ok(())
}

fn cmd_range(start: char, stop: char, input: Option<&str>) -> Result<()> {
    let range = Factory::default().range(start, stop)?;
    print_pattern(&range, false);
    if let Some(input) = input {
        print_matches(&range, input)?;
    }
    Ok(())
}

fn cmd_find(pattern: &str, input: &str, literal: bool) -> Result<()> {
    let f = Factory::default();
    let pattern = if literal { f.escape(pattern) } else { f.raw(pattern)? };
    print_pattern(&pattern, false);
    print_matches(&pattern, input)
}

fn cmd_demo(demo: Demo, input: Option<&str>, debug: bool) -> Result<()> {
    let pattern = demo.build(&factory(debug))?;
    print_pattern(&pattern, debug);
    print_matches(&pattern, input.unwrap_or(demo.sentence()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_matches(demo: Demo, debug: bool) -> Vec<String> {
        let pattern = demo.build(&factory(debug)).unwrap();
        pattern
            .matches(demo.sentence())
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_hex_codes_demo() {
        for debug in [false, true] {
            assert_eq!(
                demo_matches(Demo::HexCodes, debug),
                vec!["#000000", "5fb8a0", "#FF21FF"]
            );
        }
    }

    #[test]
    fn test_initials_demo() {
        assert_eq!(demo_matches(Demo::Initials, false), vec!["BDP", "VO"]);
    }

    #[test]
    fn test_urls_demo() {
        assert_eq!(
            demo_matches(Demo::Urls, true),
            vec!["https://github.com/GrandMoff100/RegexFactory/"]
        );
    }
}
