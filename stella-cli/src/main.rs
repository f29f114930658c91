/*!
  Binary for the CLI of stella: stl
*/

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod cli;
pub mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use colored::Colorize;

use cli::CliApp;
use error::CliError;
use stella::cache::TjCache;
use stella::execution::{TransformationEngine, TransformationParameters};
use stella::model::{Relation, Row};
use stella::storage::{dsv, DataStore, MemoryStore};

/// Assemble the source database from the declared tables, reading each
/// table's rows from its file. Tables without a file stay empty.
fn load_source(
    parameters: &TransformationParameters,
    import_directory: &Path,
) -> Result<MemoryStore, CliError> {
    let mut store = MemoryStore::new();
    for table in &parameters.tables {
        let relation = table.relation();
        store.add_table(relation.clone(), table.unique.clone());

        let Some(file) = &table.file else {
            log::warn!("table \"{}\" declares no file, leaving it empty", table.name);
            continue;
        };
        let path = if file.is_absolute() {
            file.clone()
        } else {
            import_directory.join(file)
        };
        log::info!("loading table \"{}\" from {}", table.name, path.display());
        let rows = dsv::read_table(&path, &relation)?;
        store.insert_rows(&relation, &rows)?;
    }
    Ok(store)
}

/// Write every materialized table into the export directory, one file per
/// table, and return the total number of exported rows.
fn export_tables(
    warehouse: &MemoryStore,
    tables: &[Relation],
    cli: &CliApp,
) -> Result<usize, CliError> {
    fs::create_dir_all(&cli.output.export_directory)?;

    let mut row_count = 0;
    for table in tables {
        let path = cli
            .output
            .export_directory
            .join(format!("{}.csv", table.name));
        if path.exists() && !cli.output.overwrite {
            return Err(CliError::ExportExists { filename: path });
        }

        let rows: Vec<Row> = warehouse.rows(table)?;
        dsv::write_table(&path, table, &rows)?;
        log::info!("exported {} row(s) to {}", rows.len(), path.display());
        row_count += rows.len();
    }
    Ok(row_count)
}

fn print_finished_message(elapsed_ms: u128, tables: usize, rows: usize) {
    println!(
        "Transformation completed in {}{}. Materialized {} table(s) holding {} row(s).",
        elapsed_ms.to_string().green().bold(),
        "ms".green().bold(),
        tables.to_string().green().bold(),
        rows.to_string().green().bold(),
    );
}

fn run(cli: CliApp) -> Result<(), CliError> {
    let started = Instant::now();

    log::info!("Reading parameters ...");
    let parameters = TransformationParameters::from_file(&cli.parameters)?;

    let import_directory: PathBuf = match &cli.import_directory {
        Some(directory) => directory.clone(),
        None => cli
            .parameters
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let source = load_source(&parameters, &import_directory)?;

    let mut engine = TransformationEngine::new(source, MemoryStore::new());
    if let Some(registry) = &parameters.cache {
        let path = if registry.is_absolute() {
            registry.clone()
        } else {
            import_directory.join(registry)
        };
        engine = engine.with_cache(TjCache::load(&path)?);
    }

    log::info!("Transforming ...");
    let tables = engine.transform(&parameters)?;
    log::info!("Transformation done");

    let rows = export_tables(engine.target(), &tables, &cli)?;

    print_finished_message(started.elapsed().as_millis(), tables.len(), rows);
    Ok(())
}

fn main() {
    let cli = cli::CliApp::parse();

    cli.logging.initialize_logging();
    log::info!("Version: {}", clap::crate_version!());
    log::debug!("Parameters file: {:?}", cli.parameters);

    run(cli).unwrap_or_else(|err| {
        log::error!("{} {err}", "error:".red().bold());
        std::process::exit(1)
    })
}
