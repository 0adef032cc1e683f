use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use sitetree::mount::{self, MountOutcome, Page, PageHost, SoftNavigation};
use sitetree::serve::{self, ServeOptions};
use sitetree::{page, Config, Document, Source};

#[derive(Parser, Debug)]
#[command(name = "sitetree")]
#[command(author, version, about = "Directory tree widget for static sites: render, serve and browse a JSON directory tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: .sitetree/config.toml, searched upwards)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the tree to HTML
    Render {
        /// Tree document: URL, site-relative path, or file (default from config)
        location: Option<String>,

        /// Base URL for site-relative locations
        #[arg(long)]
        base: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only write the container element, not a full page
        #[arg(long)]
        fragment: bool,

        /// Page title
        #[arg(long, default_value = "Directory Tree")]
        title: String,

        /// Re-render whenever the tree document changes (file sources only)
        #[arg(long, requires = "output")]
        watch: bool,
    },

    /// Validate the tree document and print a summary
    Check {
        /// Tree document: URL, site-relative path, or file (default from config)
        location: Option<String>,

        /// Base URL for site-relative locations
        #[arg(long)]
        base: Option<String>,
    },

    /// Serve the tree page over HTTP
    Serve {
        /// Tree document on disk
        #[arg(long, default_value = "directory-tree.json")]
        data: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3002")]
        port: u16,

        /// Page title
        #[arg(long, default_value = "Directory Tree")]
        title: String,
    },

    /// Browse the tree in the terminal
    Browse {
        /// Tree document: URL, site-relative path, or file (default from config)
        location: Option<String>,

        /// Base URL for site-relative locations
        #[arg(long)]
        base: Option<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} {}: {}", "Error:".red().bold(), path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::load(),
    };

    let code = match run(cli.command, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            1
        }
    };
    std::process::exit(code);
}

fn resolve(location: Option<String>, base: Option<String>, config: &Config) -> Source {
    let location = location.unwrap_or_else(|| config.source.path.clone());
    let base = base.or_else(|| config.source.base_url.clone());
    Source::resolve(&location, base.as_deref())
}

fn run(command: Command, config: Config) -> sitetree::error::Result<i32> {
    match command {
        Command::Render {
            location,
            base,
            output,
            fragment,
            title,
            watch,
        } => {
            let source = resolve(location, base, &config);
            render(&source, &config, output.as_deref(), fragment, &title, watch)
        }

        Command::Check { location, base } => {
            let source = resolve(location, base, &config);
            match source.load() {
                Ok(tree) => {
                    let summary = tree.summary();
                    println!("{} {}", "✓".green().bold(), source);
                    println!("  root:        {}", tree.name);
                    println!("  directories: {}", summary.directories);
                    println!("  files:       {}", summary.files);
                    println!("  max depth:   {}", summary.max_depth);
                    Ok(0)
                }
                Err(e) => {
                    println!("{} {}", "✗".red().bold(), source);
                    println!("  {}", e);
                    Ok(1)
                }
            }
        }

        Command::Serve { data, port, title } => {
            serve::start(ServeOptions {
                port,
                data,
                title,
                config,
            })?;
            Ok(0)
        }

        Command::Browse { location, base } => {
            let source = resolve(location, base, &config);
            sitetree::tui::run(source, config)?;
            Ok(0)
        }

        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sitetree", &mut io::stdout());
            Ok(0)
        }
    }
}

fn render(
    source: &Source,
    config: &Config,
    output: Option<&Path>,
    fragment: bool,
    title: &str,
    watch: bool,
) -> sitetree::error::Result<i32> {
    let nav = match (watch, source) {
        (true, Source::File(path)) => Some(SoftNavigation::watch(path)?),
        (true, Source::Http(_)) => {
            eprintln!(
                "{} --watch only follows local files; rendering once",
                "Warning:".yellow().bold()
            );
            None
        }
        (false, _) => None,
    };

    let mut page = Page::with_container(&config.mount.container_id);
    let mut last: Option<MountOutcome> = None;
    let mut write_error: Option<io::Error> = None;

    mount::run(&mut page, source, config, nav.as_ref(), |page, outcome| {
        let html = page_html(page.document(), config, fragment, title);
        if let Err(e) = write_output(output, &html) {
            write_error = Some(e);
            return false;
        }
        match outcome {
            MountOutcome::Rendered(_) if nav.is_some() => {
                eprintln!("{} {}", "Rendered".green(), output_name(output));
            }
            MountOutcome::Failed(e) => {
                eprintln!("{} {}", "Failed to load directory tree:".red().bold(), e);
            }
            _ => {}
        }
        last = Some(outcome.clone());
        true
    });

    if let Some(e) = write_error {
        return Err(e.into());
    }
    Ok(match last {
        Some(MountOutcome::Rendered(_)) => 0,
        _ => 1,
    })
}

fn page_html(doc: &Document, config: &Config, fragment: bool, title: &str) -> String {
    if fragment {
        doc.get_element_by_id(&config.mount.container_id)
            .map(|c| doc.to_html(c))
            .unwrap_or_default()
    } else {
        page::to_string(doc, title)
    }
}

fn write_output(output: Option<&Path>, html: &str) -> io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, html),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}

fn output_name(output: Option<&Path>) -> String {
    output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string())
}
