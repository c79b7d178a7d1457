//! flow2ts - converts the type annotations of Flow files to TypeScript.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use swc_common::errors::{ColorConfig, Handler};
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap};
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flow2ts::{Compiler, RuleRegistry};

#[derive(Parser, Debug)]
#[command(name = "flow2ts")]
#[command(about = "Convert Flow type annotations to TypeScript")]
struct Cli {
    /// Flow files to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory to write converted files to (default: next to each input)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Print converted files to stdout instead of writing them
    #[arg(long)]
    stdout: bool,

    /// Extension of the converted files
    #[arg(long, default_value = "ts")]
    extension: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let registry = match RuleRegistry::builtin() {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to build rules: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let compiler = Compiler::new(Arc::new(registry));

    let mut tasks = JoinSet::new();
    for (index, path) in cli.files.iter().cloned().enumerate() {
        let compiler = compiler.clone();
        tasks.spawn_blocking(move || (index, convert_file(&compiler, &path)));
    }

    let mut outputs = vec![None; cli.files.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, output)) => outputs[index] = output,
            Err(e) => error!("Conversion task failed: {}", e),
        }
    }

    let mut failed = false;
    for (path, output) in cli.files.iter().zip(outputs) {
        let Some(code) = output else {
            failed = true;
            continue;
        };
        if cli.stdout {
            print!("{}", code);
            continue;
        }
        let target = out_path(path, cli.out_dir.as_deref(), &cli.extension);
        match fs::write(&target, code) {
            Ok(()) => info!("Wrote {}", target.display()),
            Err(e) => {
                error!("Failed to write {}: {}", target.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Converts one file, reporting failures on stderr. `None` if the file could not be converted.
fn convert_file(compiler: &Compiler, path: &Path) -> Option<String> {
    let cm = Lrc::<SourceMap>::default();
    let handler = Handler::with_tty_emitter(ColorConfig::Auto, true, false, Some(cm.clone()));

    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            handler
                .struct_err(&format!("failed to read {}: {}", path.display(), e))
                .emit();
            return None;
        }
    };
    let fm = cm.new_source_file(FileName::Real(path.to_path_buf()), src);

    match compiler.compile_file(&cm, &fm) {
        Ok(output) => Some(output.code),
        Err(e) => {
            let message = e.error.to_string();
            match e.error.span() {
                Some(span) => handler.struct_span_err(span, &message).emit(),
                None => handler.struct_err(&format!("{}", e)).emit(),
            }
            None
        }
    }
}

fn out_path(input: &Path, out_dir: Option<&Path>, extension: &str) -> PathBuf {
    let target = input.with_extension(extension);
    match (out_dir, target.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => target,
    }
}
