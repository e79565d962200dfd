//! Command-line front end.
//!
//! A thin shell over `SymptomForm`: flags fill in the form fields, the
//! subcommand decides whether to stop at extraction, at the composed
//! prompt, or to stream a response.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config;
use crate::form::{Notice, SymptomForm};
use crate::pipeline::extraction::{check_upload_size, detect_format, DocumentExtractor, ExtractionError};
use crate::pipeline::generation::{GeminiClient, GenerationError};
use crate::pipeline::processor::{GuideError, GuidePipeline};
use crate::pipeline::prompt::{Category, Section};

#[derive(Parser, Debug)]
#[command(
    name = "appointment-guide",
    version,
    about = "Explain symptoms and prepare questions for a medical appointment."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the text extracted from a .pdf or .docx file
    Extract {
        file: PathBuf,
    },
    /// Print the prompt that would be sent, without calling the model
    Prompt(FormArgs),
    /// Stream a guide from Gemini
    Generate {
        #[command(flatten)]
        form: FormArgs,

        /// Sampling temperature, 0.0 to 1.0
        #[arg(long, default_value_t = config::DEFAULT_CREATIVITY)]
        creativity: f32,
    },
}

#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Symptom notes as .pdf or .docx
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Symptom text. Replaces text extracted from --file
    #[arg(long)]
    pub text: Option<String>,

    /// Appointment type
    #[arg(long, default_value = "General Practitioner")]
    pub category: Category,

    #[arg(long)]
    pub no_explain: bool,

    #[arg(long)]
    pub no_questions: bool,

    #[arg(long)]
    pub no_summary: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Notice(Notice),

    #[error("Failed to start Gemini client: {0}")]
    Client(#[from] GenerationError),
}

impl From<Notice> for CliError {
    fn from(notice: Notice) -> Self {
        Self::Notice(notice)
    }
}

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        match self.command {
            Commands::Extract { file } => run_extract(&file),
            Commands::Prompt(args) => run_prompt(&args),
            Commands::Generate { form, creativity } => run_generate(&form, creativity),
        }
    }
}

fn run_extract(path: &Path) -> Result<(), CliError> {
    let extractor = DocumentExtractor::default();
    let mut form = SymptomForm::new();
    let bytes = read_upload(path)?;
    form.upload(&extractor, &display_name(path), bytes)?;
    println!("{}", form.text);
    Ok(())
}

fn run_prompt(args: &FormArgs) -> Result<(), CliError> {
    let extractor = DocumentExtractor::default();
    let form = build_form(args, &extractor)?;
    let prompt = form.compose()?;
    println!("{prompt}");
    Ok(())
}

fn run_generate(args: &FormArgs, creativity: f32) -> Result<(), CliError> {
    let client = GeminiClient::from_env()?;
    let pipeline = GuidePipeline::with_model(&client);

    let mut form = build_form(args, pipeline.extractor())?;
    form.set_creativity(creativity)?;

    let mut out = TailWriter::new(io::stdout().lock());
    let result = form.submit(&pipeline, |buffer| out.publish(buffer));
    out.finish();
    result?;
    Ok(())
}

/// Streams a growing buffer to a writer. Each call carries the whole
/// buffer; only the new tail is written.
///
/// A broken pipe must not abort the stream, so write failures are logged
/// once and otherwise ignored.
struct TailWriter<W> {
    out: W,
    printed: usize,
    failed: bool,
}

impl<W: Write> TailWriter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            failed: false,
        }
    }

    fn publish(&mut self, buffer: &str) {
        let tail = &buffer[self.printed..];
        self.printed = buffer.len();
        let result = self
            .out
            .write_all(tail.as_bytes())
            .and_then(|()| self.out.flush());
        self.record(result);
    }

    /// Terminate the output with a newline if anything was printed.
    fn finish(&mut self) {
        if self.printed > 0 {
            let result = writeln!(self.out);
            self.record(result);
        }
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if !self.failed {
                tracing::warn!(error = %e, "Failed to write output to stdout");
                self.failed = true;
            }
        }
    }
}

/// Fill a form from flags. An upload failure is fatal only when there is
/// no --text to fall back on.
fn build_form(args: &FormArgs, extractor: &DocumentExtractor) -> Result<SymptomForm, CliError> {
    let mut form = SymptomForm::new();

    if let Some(path) = &args.file {
        let loaded = read_upload(path).and_then(|bytes| {
            form.upload(extractor, &display_name(path), bytes)
                .map_err(CliError::from)
        });
        match loaded {
            Ok(()) => {}
            Err(CliError::Notice(notice)) if args.text.is_some() => {
                tracing::warn!(%notice, "Upload ignored, using --text");
            }
            Err(e) => return Err(e),
        }
    }
    if let Some(text) = &args.text {
        form.set_text(text.as_str());
    }

    form.set_category(args.category);
    form.set_section(Section::Explanation, !args.no_explain);
    form.set_section(Section::Questions, !args.no_questions);
    form.set_section(Section::Summary, !args.no_summary);
    Ok(form)
}

/// Read an upload, refusing unsupported and oversized files before
/// loading them.
fn read_upload(path: &Path) -> Result<Vec<u8>, CliError> {
    let read_error = |source| CliError::Read {
        path: path.display().to_string(),
        source,
    };

    let size = std::fs::metadata(path).map_err(read_error)?.len();
    screen_upload(&display_name(path), size)
        .map_err(|e| CliError::Notice(GuideError::from(e).into()))?;
    std::fs::read(path).map_err(read_error)
}

/// Checks that need only the name and size. Format comes first, so an
/// oversized file of the wrong type is reported as unsupported.
fn screen_upload(file_name: &str, size: u64) -> Result<(), ExtractionError> {
    if !detect_format(file_name).is_supported() {
        return Err(ExtractionError::UnsupportedFormat);
    }
    check_upload_size(size)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
