//! feedwriter CLI - render CSV/JSON records as JSON, CSV and Atom feeds
//!
//! ```bash
//! feedwriter render posts.csv --map map.json --view json --view atom
//! feedwriter render posts.csv --map map.json --view atom --output-dir out/
//! feedwriter parse posts.csv            # Dump parsed records as JSON
//! feedwriter example-map                # Show a sample map file
//! feedwriter operations                 # Show available map operations
//! feedwriter render posts.csv --map map.json --log-json run.jsonl
//! ```

use clap::{Parser, Subcommand};
use feedwriter::config::Settings;
use feedwriter::logs::{drain, LogEntry, LOG_BROADCASTER};
use feedwriter::pipeline::{render_file, RenderOptions};
use feedwriter::{example_map, operations_description, parse_file, ViewKind};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "feedwriter")]
#[command(about = "Map records once and render them as several feed formats", long_about = None)]
struct Cli {
    /// Also write run log entries to this file, one JSON object per line
    #[arg(long, global = true)]
    log_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map an input file and render the selected views
    Render {
        /// Input file (.csv, .tsv, .json, .ndjson, .jsonl)
        input: PathBuf,

        /// JSON map file
        #[arg(short, long)]
        map: PathBuf,

        /// View to render; repeat for several (default: json)
        #[arg(short, long = "view", value_enum)]
        views: Vec<ViewKind>,

        /// Write <input stem>.<ext> files here instead of stdout
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Atom feed title
        #[arg(long)]
        title: Option<String>,

        /// Atom feed id
        #[arg(long)]
        feed_id: Option<String>,

        /// Atom feed link
        #[arg(long)]
        feed_link: Option<String>,

        /// Indent JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Parse an input file and output its records as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show an example map file
    ExampleMap,

    /// Show available map operations
    Operations,
}

fn main() {
    let settings = Settings::from_env();
    let cli = Cli::parse();
    let mut log_receiver = cli.log_json.as_ref().map(|_| LOG_BROADCASTER.subscribe());

    let result = match cli.command {
        Commands::Render {
            input,
            map,
            views,
            output_dir,
            title,
            feed_id,
            feed_link,
            pretty,
        } => {
            let mut options = RenderOptions::from_settings(&settings);
            options.map_path = map;
            options.views = views;
            options.pretty = pretty;
            if output_dir.is_some() {
                options.output_dir = output_dir;
            }
            if let Some(title) = title {
                options.meta.title = title;
            }
            if let Some(id) = feed_id {
                options.meta.id = id;
            }
            if feed_link.is_some() {
                options.meta.link = feed_link;
            }
            cmd_render(&input, &options)
        }

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::ExampleMap => cmd_example_map(),

        Commands::Operations => cmd_operations(),
    };

    if let (Some(path), Some(receiver)) = (&cli.log_json, log_receiver.as_mut()) {
        if let Err(e) = write_log(path, &drain(receiver)) {
            eprintln!("Error: cannot write log to {}: {}", path.display(), e);
        }
    }

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_render(input: &Path, options: &RenderOptions) -> Result<(), Box<dyn std::error::Error>> {
    let result = render_file(input, options)?;

    if options.output_dir.is_none() {
        for output in &result.outputs {
            println!("{}", output.content);
        }
    }

    eprintln!("\n✨ Done! {} records rendered", result.record_count);
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let parsed = parse_file(input)?;

    eprintln!("   Encoding: {}", parsed.encoding);
    if let Some(delimiter) = parsed.delimiter {
        eprintln!(
            "   Delimiter: '{}'",
            match delimiter {
                '\t' => "\\t".to_string(),
                c => c.to_string(),
            }
        );
    }
    eprintln!("   Columns: {}", parsed.headers.join(", "));
    eprintln!("✅ Parsed {} records", parsed.records.len());

    let json = serde_json::to_string_pretty(&parsed.records)?;
    write_output(&json, output)
}

fn cmd_example_map() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", example_map().to_json()?);
    Ok(())
}

fn cmd_operations() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", operations_description());
    Ok(())
}

fn write_log(path: &Path, entries: &[LogEntry]) -> Result<(), Box<dyn std::error::Error>> {
    let mut content = String::new();
    for entry in entries {
        content.push_str(&serde_json::to_string(entry)?);
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
