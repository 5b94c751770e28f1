use crate::tables::Table;
use std::cmp::Ordering;
use std::error::Error;

/// Per-requester channel-gain rankings for one scenario.
///
/// `per_fue[i]` holds requester i's `(channel id, gain)` pairs sorted by
/// gain descending, so the best channel is first. The identity column of
/// the gain table is dropped; every list has exactly one entry per channel.
#[derive(Debug, Clone)]
pub struct RankedGains {
    pub per_fue: Vec<Vec<(String, f64)>>,
}

impl RankedGains {
    /// Mean gain over ALL of a requester's channels (not only the top ones).
    /// An empty ranking averages to zero.
    pub fn average_gain(&self, fue_index: usize) -> f64 {
        let entries = &self.per_fue[fue_index];
        if entries.is_empty() {
            return 0.0;
        }
        let sum: f64 = entries.iter().map(|(_, gain)| gain).sum();
        sum / entries.len() as f64
    }

    /// Number of requesters covered by this table
    pub fn num_fue(&self) -> usize {
        self.per_fue.len()
    }
}

/// Build per-requester gain rankings from a gain table.
///
/// The table's first column is the requester identity and is dropped; the
/// remaining columns are one channel each. Row and column counts must match
/// the scenario's declared sizes.
pub fn load_gain_table(
    table: &Table,
    num_mue: usize,
    num_fue: usize,
) -> Result<RankedGains, Box<dyn Error>> {
    if table.header.len() != num_mue + 1 {
        return Err(format!(
            "Gain table has {} channel columns, scenario declares {}",
            table.header.len().saturating_sub(1),
            num_mue
        )
        .into());
    }
    if table.rows.len() != num_fue {
        return Err(format!(
            "Gain table has {} requester rows, scenario declares {}",
            table.rows.len(),
            num_fue
        )
        .into());
    }

    let channel_ids = &table.header[1..];
    let mut per_fue = Vec::with_capacity(num_fue);
    for (row_index, row) in table.rows.iter().enumerate() {
        let mut entries = Vec::with_capacity(num_mue);
        for (channel, cell) in channel_ids.iter().zip(&row[1..]) {
            let gain: f64 = cell.parse().map_err(|_| {
                format!(
                    "Gain table row {}, channel '{}': '{}' is not a number",
                    row_index + 1,
                    channel,
                    cell
                )
            })?;
            entries.push((channel.clone(), gain));
        }
        // Stable descending sort keeps column order for exactly equal gains
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        per_fue.push(entries);
    }

    Ok(RankedGains { per_fue })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gain_table(channels: &[&str], rows: &[Vec<&str>]) -> Table {
        let mut header = vec!["FUE".to_string()];
        header.extend(channels.iter().map(|c| c.to_string()));
        Table {
            header,
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, cells)| {
                    let mut row = vec![(i + 1).to_string()];
                    row.extend(cells.iter().map(|c| c.to_string()));
                    row
                })
                .collect(),
        }
    }

    #[test]
    fn test_rankings_are_descending_and_identity_free() {
        let table = gain_table(
            &["MUE_1", "MUE_2", "MUE_3"],
            &[vec!["0.2", "0.9", "0.5"], vec!["0.7", "0.1", "0.3"]],
        );
        let gains = load_gain_table(&table, 3, 2).unwrap();

        assert_eq!(gains.per_fue[0].len(), 3);
        assert_eq!(gains.per_fue[0][0], ("MUE_2".to_string(), 0.9));
        assert_eq!(gains.per_fue[0][2], ("MUE_1".to_string(), 0.2));
        assert_eq!(gains.per_fue[1][0], ("MUE_1".to_string(), 0.7));
        // Identity cells (1, 2) never show up as gains
        assert!(gains
            .per_fue
            .iter()
            .flatten()
            .all(|(channel, _)| channel.starts_with("MUE_")));
    }

    #[test]
    fn test_average_covers_all_channels() {
        let table = gain_table(&["MUE_1", "MUE_2"], &[vec!["4.0", "8.0"]]);
        let gains = load_gain_table(&table, 2, 1).unwrap();
        assert_eq!(gains.average_gain(0), 6.0);
    }

    #[test]
    fn test_declared_size_mismatch_is_rejected() {
        let table = gain_table(&["MUE_1", "MUE_2"], &[vec!["1.0", "2.0"]]);
        assert!(load_gain_table(&table, 3, 1).is_err());
        assert!(load_gain_table(&table, 2, 2).is_err());
    }

    #[test]
    fn test_malformed_gain_cell_is_rejected() {
        let table = gain_table(&["MUE_1"], &[vec!["n/a"]]);
        assert!(load_gain_table(&table, 1, 1).is_err());
    }
}
