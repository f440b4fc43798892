//! Logger setup.

/// Installs a stderr logger with local timestamps.
///
/// The dispatcher itself accepts every level; `level` only sets the global maximum, which
/// [`set_level`] can change later. Fails if a logger has already been installed.
pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(std::io::stderr())
        .apply()?;
    set_level(level);
    Ok(())
}

/// Changes the most verbose level that is emitted.
pub fn set_level(level: log::LevelFilter) {
    log::set_max_level(level);
}
