use {
    anyhow::{
        anyhow,
        Result,
    },
    std::{
        fs::{
            create_dir_all,
            File,
        },
        path::Path,
        sync::Arc,
    },
    tracing::Level,
    tracing_subscriber::{
        fmt::{
            layer,
            writer::MakeWriterExt,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
    },
};

/// Install the global tracing subscriber.
///
/// Events go to stdout and, if a path is given, to a log file next to it.
/// Each writer only sees events up to its own level, INFO if none is given.
pub fn setup_logging(
    path: Option<&Path>,
    min_level_file: Option<Level>,
    min_level_stdout: Option<Level>,
) -> Result<()> {
    let file_layer = match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let log_file = Arc::new(File::create(path)?);
            Some(
                layer()
                    .with_writer(log_file.with_max_level(min_level_file.unwrap_or(Level::INFO)))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        // File writer
        .with(file_layer)
        // Stdout writer
        .with(
            layer()
                .with_writer(std::io::stdout.with_max_level(min_level_stdout.unwrap_or(Level::INFO)))
                .compact()
                .pretty()
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(false),
        )
        // Create and set Subscriber
        .try_init()
        .map_err(|e| anyhow!("could not install the tracing subscriber: {e}"))
}
