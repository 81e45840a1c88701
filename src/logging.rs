use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
};

use chrono::Local;
use env_logger::{Builder, Target};
use log::{LevelFilter, warn};

/// Copies every log line to stderr and to the log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Debug } else { LevelFilter::Info }
}

/// `RUST_LOG` still wins over the default level.
pub fn init(verbose: bool, log_file: &Path) {
    let mut builder = Builder::new();
    builder
        .filter_level(level_for(verbose))
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        });

    let file = OpenOptions::new().create(true).append(true).open(log_file);
    match file {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(Tee { file })));
            builder.init();
        }
        Err(e) => {
            builder.target(Target::Stderr);
            builder.init();
            warn!("Could not open log file {}, logging to stderr only: {e}", log_file.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_switches_to_debug() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
