//! medsum CLI - render symptom summaries to PDF

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use medsum::{
    inspect_pdf, FontConfig, JsonFormat, RenderJob, RenderOptions, RenderStats, SummaryPayload,
    SummaryRenderer, FONT_PATH_ENV,
};

#[derive(Parser)]
#[command(name = "medsum")]
#[command(version)]
#[command(about = "Render symptom summaries into printable PDF documents", long_about = None)]
struct Cli {
    /// Input summary (plain text or generator JSON)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Paper size (A4, B5, Receipt)
    #[arg(long, default_value = "A4")]
    size: String,

    /// TrueType font to embed
    #[arg(long, value_name = "PATH", env = FONT_PATH_ENV, global = true)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a summary to PDF
    Render {
        /// Input summary (plain text or generator JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input name with .pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Paper size (A4, B5, Receipt)
        #[arg(long, default_value = "A4")]
        size: String,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Append the patient-facing note from a JSON payload
        #[arg(long)]
        explanation: bool,
    },

    /// Print the layout blocks for a summary
    Layout {
        /// Input summary (plain text or generator JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Paper size (A4, B5, Receipt)
        #[arg(long, default_value = "A4")]
        size: String,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: LayoutFormat,
    },

    /// Render several summaries in parallel
    Batch {
        /// Input summaries
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Paper size (A4, B5, Receipt)
        #[arg(long, default_value = "A4")]
        size: String,
    },

    /// Show information about a rendered PDF
    Info {
        /// PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which font would be used
    Fonts,

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LayoutFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact JSON
    Compact,
    /// Renderer rich-text markup
    Markup,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let fonts = font_config(cli.font.as_deref());

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            size,
            title,
            explanation,
        }) => cmd_render(
            &input,
            output.as_deref(),
            &size,
            title.as_deref(),
            explanation,
            &fonts,
        ),
        Some(Commands::Layout {
            input,
            size,
            format,
        }) => cmd_layout(&input, &size, format, &fonts),
        Some(Commands::Batch {
            inputs,
            output,
            size,
        }) => cmd_batch(&inputs, &output, &size, &fonts),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Fonts) => {
            cmd_fonts(&fonts);
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: render if input is provided
            if let Some(input) = cli.input {
                cmd_render(&input, cli.output.as_deref(), &cli.size, None, false, &fonts)
            } else {
                println!("{}", "Usage: medsum <FILE> [OUTPUT]".yellow());
                println!("       medsum --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn font_config(font: Option<&Path>) -> FontConfig {
    match font {
        Some(path) => FontConfig::new().with_primary(path),
        None => FontConfig::new(),
    }
}

fn read_payload(input: &Path) -> Result<SummaryPayload, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(input)?;
    Ok(SummaryPayload::parse(&raw)?)
}

/// `notes/visit.json` → `notes/visit.pdf`
fn default_output(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

/// Output paths for a batch, one per input. Two inputs that would write the
/// same file are rejected before anything is rendered.
fn batch_outputs(inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::with_capacity(inputs.len());
    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = input
            .file_name()
            .ok_or_else(|| format!("{} is not a file", input.display()))?;
        let path = output_dir.join(default_output(Path::new(name)));
        if let Some(previous) = seen.insert(path.clone(), input.as_path()) {
            return Err(format!(
                "{} and {} would both write {}",
                previous.display(),
                input.display(),
                path.display()
            ));
        }
        outputs.push(path);
    }
    Ok(outputs)
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    size: &str,
    title: Option<&str>,
    explanation: bool,
    fonts: &FontConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = read_payload(input)?;

    let mut options = RenderOptions::new().with_explanation(explanation);
    if let Some(title) = title {
        options = options.with_title(title);
    }

    let renderer = SummaryRenderer::with_font_config(fonts).with_options(options);
    let doc = renderer.render_payload(&payload, size)?;

    let path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));
    fs::write(&path, &doc.bytes)?;

    println!("{} {}", "Saved to".green(), path.display());
    print_stats(&doc.stats);
    if renderer.fonts().is_fallback() {
        println!(
            "{} no embeddable font found; non-Latin text will not render",
            "Warning:".yellow().bold()
        );
    }

    Ok(())
}

fn cmd_layout(
    input: &Path,
    size: &str,
    format: LayoutFormat,
    fonts: &FontConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = read_payload(input)?;
    let renderer = SummaryRenderer::with_font_config(fonts);
    let layout = renderer.layout(&payload.to_document_text(false), size);

    let out = match format {
        LayoutFormat::Json => layout.to_json(JsonFormat::Pretty)?,
        LayoutFormat::Compact => layout.to_json(JsonFormat::Compact)?,
        LayoutFormat::Markup => layout.to_markup(),
    };
    println!("{}", out.trim_end());

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    size: &str,
    fonts: &FontConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let outputs = batch_outputs(inputs, output_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let payload = read_payload(input)?;
        jobs.push(RenderJob::new(payload.to_document_text(false), size));
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Rendering...");
    let renderer = SummaryRenderer::with_font_config(fonts);
    let results = renderer.render_batch(&jobs);

    let mut total = RenderStats::new();
    let mut failures = 0;
    for ((input, path), result) in inputs.iter().zip(&outputs).zip(results) {
        pb.set_message(input.display().to_string());
        match result {
            Ok(doc) => {
                fs::write(path, &doc.bytes)?;
                log::debug!("{} -> {}", input.display(), path.display());
                total.merge(&doc.stats);
            }
            Err(e) => {
                if e.is_generation_failure() {
                    log::warn!("{}: {}", input.display(), e.detail());
                }
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
                failures += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} documents, {} pages",
        "Rendered".green().bold(),
        inputs.len() - failures,
        total.page_count
    );
    if failures > 0 {
        return Err(format!("{} documents failed", failures).into());
    }

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let report = inspect_pdf(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), report.version);
    println!("{}: {}", "Pages".bold(), report.page_count);

    if let Some((width, height)) = report.page_sizes.first() {
        println!(
            "{}: {:.0} × {:.0} mm",
            "Page size".bold(),
            width / medsum::geometry::POINTS_PER_MM,
            height / medsum::geometry::POINTS_PER_MM
        );
    }
    if let Some(ref title) = report.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref producer) = report.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = report.creation_date {
        println!("{}: {}", "Created".bold(), created);
    }

    println!();
    println!("{}", "Fonts".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for font in &report.fonts {
        println!("{}: {} ({})", font.resource.bold(), font.base_font, font.subtype);
    }

    Ok(())
}

fn cmd_fonts(config: &FontConfig) {
    println!("{}", "Font Candidates".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for path in &config.candidates {
        let marker = if path.is_file() { "found".green() } else { "missing".dimmed() };
        println!("  {} {}", marker, path.display());
    }

    let renderer = SummaryRenderer::with_font_config(config);
    let fonts = renderer.fonts();

    println!();
    println!("{}: {}", "Active font".bold(), fonts.font_name());
    println!(
        "{}: {}",
        "Embedded".bold(),
        if fonts.is_embedded() { "Yes" } else { "No" }
    );
    if let Some(reason) = fonts.fallback_reason() {
        println!("{}: {}", "Fallback reason".bold(), reason.yellow());
    }
}

fn print_stats(stats: &RenderStats) {
    println!(
        "  {} {} pages, {} headings, {} bullets, {} paragraphs ({})",
        "└─".dimmed(),
        stats.page_count,
        stats.heading_count,
        stats.bullet_count,
        stats.body_count,
        stats.font_name
    );
    if stats.substituted_glyphs > 0 {
        println!(
            "     {} characters could not be rendered",
            stats.substituted_glyphs.to_string().yellow()
        );
    }
}

fn cmd_version() {
    println!("{} {}", "medsum".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Symptom summary PDF renderer");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_replaces_extension() {
        assert_eq!(default_output(Path::new("notes/visit.json")), PathBuf::from("notes/visit.pdf"));
        assert_eq!(default_output(Path::new("summary")), PathBuf::from("summary.pdf"));
    }

    #[test]
    fn test_batch_outputs_reject_same_file_name() {
        let dir = Path::new("out");
        let inputs = vec![PathBuf::from("a/visit.txt"), PathBuf::from("b/visit.txt")];
        let err = batch_outputs(&inputs, dir).unwrap_err();
        assert!(err.contains("a/visit.txt"));
        assert!(err.contains("b/visit.txt"));

        let inputs = vec![PathBuf::from("a/visit.txt"), PathBuf::from("a/visit.json")];
        assert!(batch_outputs(&inputs, dir).is_err());
    }

    #[test]
    fn test_batch_outputs_one_per_input() {
        let inputs = vec![PathBuf::from("a/first.txt"), PathBuf::from("b/second.json")];
        let outputs = batch_outputs(&inputs, Path::new("out")).unwrap();
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/first.pdf"), PathBuf::from("out/second.pdf")]
        );
    }

    #[test]
    fn test_batch_collision_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("visit.txt"), "- 咳").unwrap();
        }
        let inputs = vec![dir.path().join("a/visit.txt"), dir.path().join("b/visit.txt")];
        let out = dir.path().join("out");

        assert!(cmd_batch(&inputs, &out, "A4", &FontConfig::empty()).is_err());
        assert!(!out.join("visit.pdf").exists());
    }

    #[test]
    fn test_font_config_primary() {
        let config = font_config(Some(Path::new("/fonts/custom.ttf")));
        assert_eq!(config.candidates[0], PathBuf::from("/fonts/custom.ttf"));
    }

    #[test]
    fn test_read_payload_json_and_text() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("a.json");
        fs::write(&json, r#"{"summary": "■ 主訴\n腹痛", "explanation": "メモ"}"#).unwrap();
        let payload = read_payload(&json).unwrap();
        assert_eq!(payload.explanation.as_deref(), Some("メモ"));

        let text = dir.path().join("b.txt");
        fs::write(&text, "- 咳").unwrap();
        assert_eq!(read_payload(&text).unwrap().summary, "- 咳");
    }

    #[test]
    fn test_render_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("visit.txt");
        fs::write(&input, "■ Chief complaint\n- headache").unwrap();

        cmd_render(&input, None, "B5", Some("Summary"), false, &FontConfig::empty()).unwrap();

        let pdf = fs::read(dir.path().join("visit.pdf")).unwrap();
        let report = inspect_pdf(&pdf).unwrap();
        assert_eq!(report.page_count, 1);
        assert_eq!(report.title.as_deref(), Some("Summary"));
    }
}
