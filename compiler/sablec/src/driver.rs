//! The pipeline.

use crate::export;
use crate::macro_map::MacroMap;
use sable_diagnostic::Emitter;
use sable_ir::StringInterner;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Command-line options for one run.
#[derive(Debug, Default)]
pub struct Options {
    /// Preprocessed C++ input file.
    pub input: PathBuf,
    /// JSON output path; stdout when absent and `dump_tree` is set.
    pub output: Option<PathBuf>,
    /// Print the export to stdout.
    pub dump_tree: bool,
    /// Optional macro-call table from the preprocessor stage.
    pub macro_table: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot write `{path}`: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("bad macro table: {0}")]
    MacroTable(#[from] crate::macro_map::MacroMapError),
    #[error("cannot serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Run the pipeline. Returns the process exit code: 0 on a clean parse,
/// 1 when diagnostics were reported.
pub fn run(options: &Options) -> Result<i32, DriverError> {
    let path = options.input.display().to_string();
    let source = std::fs::read_to_string(&options.input).map_err(|source| DriverError::Read {
        path: path.clone(),
        source,
    })?;

    let macro_map = match &options.macro_table {
        Some(table_path) => {
            let text =
                std::fs::read_to_string(table_path).map_err(|source| DriverError::Read {
                    path: table_path.display().to_string(),
                    source,
                })?;
            Some(MacroMap::parse(&text)?)
        }
        None => None,
    };

    let interner = StringInterner::new();
    let lexed = sable_lexer::lex(&source, &path, &interner);
    let output = sable_parse::parse(&lexed.tokens, &lexed.line_map, &interner);

    let emitter = Emitter::new(&interner);
    let mut stderr = std::io::stderr().lock();
    if let Err(error) = emitter.emit_all(&mut stderr, &output.diagnostics) {
        tracing::warn!(%error, "could not write diagnostics");
    }

    let export = export::export_unit(&output, &interner, macro_map.as_ref());
    let rendered = serde_json::to_string_pretty(&export)?;
    if let Some(out_path) = &options.output {
        std::fs::write(out_path, rendered.as_bytes()).map_err(|source| DriverError::Write {
            path: out_path.display().to_string(),
            source,
        })?;
    } else if options.dump_tree {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{rendered}");
    }

    Ok(i32::from(output.has_errors()))
}
