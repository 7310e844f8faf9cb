use std::path::PathBuf;

use clap::Parser;
use vacant_lots::data::filter::LotQuery;
use vacant_lots::data::geometry::CoercionPolicy;
use vacant_lots::lots::find_lots;
use vacant_lots::ui::panels::pick_vector_file;
use vacant_lots::viz::visualize;

/// Find lots with a given status in a vector file and plot them.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// GeoJSON, Shapefile, CSV (WKT) or GeoParquet file; a file picker opens
    /// when omitted
    path: Option<PathBuf>,

    /// attribute holding the lot status
    #[arg(long, default_value = "status")]
    status_column: String,

    /// status value to keep
    #[arg(long, default_value = "empty")]
    status: String,

    /// how geometries are turned into polygons before filtering
    #[arg(long, value_enum, default_value_t = CoercionPolicy::Polygonal)]
    coerce: CoercionPolicy,

    /// plot title
    #[arg(long, default_value = "Empty Lots")]
    title: String,

    /// print the lots without opening a window
    #[arg(long)]
    no_plot: bool,

    /// more logging (-v debug, -vv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "vacant_lots=info",
        1 => "vacant_lots=debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    log::debug!("parsed arguments {args:?}");

    let Some(path) = args.path.clone().or_else(pick_vector_file) else {
        log::info!("no input file chosen");
        return;
    };

    let query = LotQuery {
        status_column: args.status_column,
        status_value: args.status,
        coercion: args.coerce,
    };

    if let Some(lots) = find_lots(&path, &query) {
        println!("{}:", args.title);
        println!("{lots}");

        if !args.no_plot {
            visualize(lots, &args.title, query);
        }
    }
}
