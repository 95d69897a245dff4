use trackstore::cli::Args;
use trackstore::config::{CONFIG_FILE_NAME, StoreConfig};
use trackstore::entities::scan_image_dir;
use trackstore::paths::{self, PathConfig};
use trackstore::{ChangeFilter, CurveStore, StoreSnapshot};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, trace, warn};

fn init_logging(args: &Args, path_config: &PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| paths::data_file("trackstore.log", path_config));
        paths::ensure_parent(&log_path)?;

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn print_summary(store: &CurveStore) {
    println!("Curves: {}", store.curve_count());
    for name in store.all_curve_names() {
        let len = store.curve_len(&name).unwrap_or(0);
        let selected = store.selection(&name).map(|s| s.len()).unwrap_or(0);
        let marker = if store.active_curve().as_deref() == Some(name.as_str()) { "*" } else { " " };
        println!("  {} {:<24} {:>6} points {:>6} selected", marker, name, len, selected);
    }
    println!("Frame: {} / {}", store.current_frame(), store.total_frames());
    match store.image_directory() {
        Some(dir) => println!("Images: {} files in {}", store.image_files().len(), dir.display()),
        None => println!("Images: none"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    init_logging(&args, &path_config)?;
    debug!("Command-line args: {:?}", args);

    let config_path = paths::config_file(CONFIG_FILE_NAME, &path_config);
    info!("Config path: {}", config_path.display());
    let config = StoreConfig::load(&config_path)?;
    let extensions = config.image_extensions.clone();

    let mut store = CurveStore::new(config);
    store.subscribe(ChangeFilter::All, |event| trace!("store event: {:?}", event));

    {
        let mut batch = store.batch();

        if let Some(path) = &args.snapshot {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
            let snapshot = StoreSnapshot::from_json(&json)
                .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
            info!(
                "Snapshot {}: {} curves, {} points",
                path.display(),
                snapshot.curves.len(),
                snapshot.point_count()
            );
            batch.restore(&snapshot)?;
        }

        if let Some(dir) = &args.images {
            let files = scan_image_dir(dir, &extensions)?;
            if files.is_empty() {
                warn!("No images found in {}", dir.display());
            }
            batch.set_image_files(dir.clone(), files);
        }

        if let Some(name) = &args.active {
            batch.set_active_curve(Some(name.as_str()))?;
        }

        if let Some(frame) = args.frame {
            let applied = batch.set_current_frame(frame);
            if applied != frame {
                warn!("Frame {} clamped to {}", frame, applied);
            }
        }
    }

    for event in store.poll_events() {
        debug!("flushed: {:?}", event);
    }

    if args.json {
        println!("{}", store.snapshot().to_json()?);
    } else {
        print_summary(&store);
    }
    Ok(())
}
