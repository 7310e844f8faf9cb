use std::path::Path;

use crate::data::filter::{filter_by_status, LotQuery};
use crate::data::geometry::{coerce_all, is_polygon_like};
use crate::data::loader::load_file;
use crate::data::model::{GeoRecordSet, GEOMETRY_COLUMN};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Load → validate → coerce → filter
// ---------------------------------------------------------------------------

/// Load `path` and keep the records selected by `query`.
///
/// Fails with [`LoadError::MissingColumn`] unless the file carries both a
/// geometry column and the query's status column.
pub fn select_lots(path: &Path, query: &LotQuery) -> Result<GeoRecordSet, LoadError> {
    let set = load_file(path)?;

    for required in [GEOMETRY_COLUMN, query.status_column.as_str()] {
        if !set.has_column(required) {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }

    let set = coerce_all(set, query.coercion)?;
    log::debug!(
        "{} of {} geometries are polygonal after {:?} coercion",
        set.iter()
            .filter(|r| r.geometry.as_ref().is_some_and(is_polygon_like))
            .count(),
        set.len(),
        query.coercion
    );

    let lots = filter_by_status(&set, query);
    log::info!(
        "{} of {} records have {} == {:?}",
        lots.len(),
        set.len(),
        query.status_column,
        query.status_value
    );
    Ok(lots)
}

/// [`select_lots`], with any failure reported on stderr and in the log
/// instead of returned.
pub fn find_lots(path: &Path, query: &LotQuery) -> Option<GeoRecordSet> {
    match select_lots(path, query) {
        Ok(lots) => Some(lots),
        Err(e) => {
            log::error!("Failed to select lots from {}: {e}", path.display());
            eprintln!("Error: {e}");
            None
        }
    }
}
