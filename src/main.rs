use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docxide_html::ConvertOptions;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input .docx file.
    input: PathBuf,

    /// Write HTML here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum depth of tables nested inside table cells.
    #[arg(long, default_value_t = ConvertOptions::default().max_nesting_depth)]
    max_depth: usize,

    /// Leave images out of the output.
    #[arg(long)]
    no_images: bool,

    /// Do not wrap dot runs in placeholder spans.
    #[arg(long)]
    no_placeholder_markers: bool,

    /// Rewrite look-alike fill-in marks (ellipsis, ". .", "./.", tabs) to "...".
    #[arg(long)]
    normalize_placeholders: bool,

    /// -v for info, -vv for debug.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let options = ConvertOptions {
        max_nesting_depth: args.max_depth,
        embed_images: !args.no_images,
        include_placeholder_markers: !args.no_placeholder_markers,
        normalize_placeholders: args.normalize_placeholders,
    };

    let html = match docxide_html::convert_docx_to_html_with_options(&args.input, &options) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Error converting {}: {e}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let written = match &args.output {
        Some(path) => std::fs::write(path, &html),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(html.as_bytes())
        }
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
