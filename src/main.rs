use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cvpress::{CancelToken, Document, Error, ExportOptions, Fonts, Language, LayoutConfig};

#[derive(Parser)]
#[command(name = "cvpress")]
#[command(version)]
#[command(about = "Lay out a structured CV onto paginated A4 PDF pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct LayoutArgs {
    /// Layout configuration JSON; unset fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Font family searched in the system font directories
    #[arg(long, value_name = "NAME")]
    font_family: Option<String>,

    /// Draw the left margin guide
    #[arg(long)]
    guides: bool,

    /// Language of the fixed labels (en, pl)
    #[arg(long, value_name = "LANG")]
    language: Option<Language>,
}

impl LayoutArgs {
    fn resolve(&self) -> Result<LayoutConfig, Error> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::from_json_file(path)?,
            None => LayoutConfig::default(),
        };
        if let Some(family) = &self.font_family {
            config.font_family = Some(family.clone());
        }
        if self.guides {
            config.show_guide = true;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render a CV document (JSON) to PDF
    Render {
        /// Input document
        #[arg(value_name = "DOC")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the page plan of a CV document as JSON
    Plan {
        #[arg(value_name = "DOC")]
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Recover a CV document from a PDF or plain-text CV
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Render {
            input,
            output,
            layout,
        } => {
            let options = ExportOptions::new(layout.resolve()?);
            let (path, exported) = cvpress::export_json_file(&input, &output, &options)?;
            for warning in &exported.warnings {
                eprintln!("warning: {warning}");
            }
            println!("{} ({} pages)", path.display(), exported.page_count);
        }
        Commands::Plan { input, layout } => {
            let config = layout.resolve()?;
            let doc = Document::from_json_file(&input)?;
            let fonts = Fonts::load(&config)?;
            let (photo, photo_warning) =
                cvpress::export::resolve_photo(&doc, &config, &CancelToken::new())?;
            let mut layout = cvpress::layout(&doc, &fonts, &config, photo.as_ref());
            if let Some(warning) = photo_warning {
                eprintln!("warning: {warning}");
                layout.warnings.insert(0, warning);
            }
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Commands::Import { input, output } => {
            let doc = import_file(&input)?;
            let json = doc.to_json_pretty()?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

fn import_file(input: &Path) -> Result<Document, Error> {
    let is_pdf = input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    let doc = if is_pdf {
        cvpress::import::parse_pdf(&std::fs::read(input)?)?
    } else {
        cvpress::import::parse_text(&std::fs::read_to_string(input)?)?
    };
    Ok(doc)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
