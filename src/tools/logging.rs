use crate::tools::env_args::retrieve_arg_value;
use env_logger::{Builder, Env, Target};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

const LOG_FILE_ARG: &str = "--log-file";
const DEFAULT_LOG_FILE: &str = "arrayforms.log";
const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global logger. Records go both to the log file and to the standard output.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logger() {
    let log_file_path = get_log_file_path();
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER));

    match open_log_file(&log_file_path) {
        Ok(log_file) => {
            builder
                .target(Target::Pipe(Box::new(TeeWriter::new(log_file))))
                .init();
        }
        Err(error) => {
            builder.init();
            warn!("Can't open log file, logging to standard output only [path: {log_file_path}]\n{error:#?}");
        }
    }
}

fn get_log_file_path() -> String {
    retrieve_arg_value(LOG_FILE_ARG)
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_owned())
}

fn open_log_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Duplicate everything written into the log file and the standard output.
struct TeeWriter {
    log_file: File,
}

impl TeeWriter {
    fn new(log_file: File) -> Self {
        Self { log_file }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.log_file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.log_file.flush()
    }
}
