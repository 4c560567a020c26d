use std::{io, result};

pub fn setup_logging(verbosity_level: u32) {
    use fern::colors::{Color, ColoredLevelConfig};

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::White)
        .debug(Color::BrightWhite)
        .trace(Color::Cyan);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let color = colors.get_color(&record.level());

            out.finish(format_args!(
                "[{}][{}]\x1b[{}m {}\x1b[0m",
                record.target(),
                record.level(),
                color.to_fg_str(),
                message
            ))
        })
        .level(match verbosity_level {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .chain(io::stdout())
        .apply()
        .unwrap();
}

/// Parses an LBA or block count, decimal or 0x-prefixed hex.
pub fn parse_lba(x: &str) -> result::Result<u64, String> {
    let r = if let Some(hex) = x.strip_prefix("0x").or_else(|| x.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        u64::from_str_radix(x, 10)
    };

    r.map_err(|e| e.to_string())
}

pub fn parse_sector_size(x: &str) -> result::Result<u64, String> {
    let x = u64::from_str_radix(x, 10).map_err(|e| e.to_string())?;
    if !x.is_power_of_two() {
        return Err("sector size not power of 2".to_owned());
    }

    Ok(x)
}
