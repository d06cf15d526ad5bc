use std::path::Path;

use anyhow::{bail, Context, Result};
use common_utils::parsing_utils::customised_csv_reader;

use crate::planning::RoomTypeConfig;

const BUFFER_CAPACITY: usize = 8 * 1024;

/// Reads room-type targets from a CSV file with the header
/// `roomTypeID,roomTypeName,roomTypeUnits,percentage`.
pub fn read_room_type_configs<P: AsRef<Path>>(path: P) -> Result<Vec<RoomTypeConfig>> {
    let path = path.as_ref();
    let mut reader = customised_csv_reader(path, BUFFER_CAPACITY)
        .with_context(|| format!("Could not open room type file: {:?}", path.as_os_str()))?;
    let mut configs = Vec::new();
    for (idx, record) in reader.deserialize::<RoomTypeConfig>().enumerate() {
        // line 1 holds the headers
        let line = idx + 2;
        let config = record.with_context(|| format!("Invalid room type on line {}", line))?;
        if !(0.0..=100.0).contains(&config.percentage) {
            bail!(
                "The percentage {} on line {} is not between 0 and 100",
                config.percentage,
                line
            );
        }
        configs.push(config);
    }
    Ok(configs)
}
