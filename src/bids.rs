use crate::tables::Table;
use std::error::Error;

/// Length of the fixed `FUE_` prefix stripped from FUE_ID to get the owner number
const FUE_ID_PREFIX_LEN: usize = 4;

/// One row of a bid table. Row order defines the requester index (1-based
/// in reports, 0-based in vectors).
#[derive(Debug, Clone)]
pub struct FueRecord {
    /// Full identity string, e.g. `FUE_17`
    pub fue_id: String,
    /// Numeric suffix of `fue_id`, the requester's owner number
    pub owner: u32,
    /// Cohort label of the base station the requester is billed under
    pub fbs: String,
    /// Monetary bid, non-negative
    pub bid: f64,
}

/// Load the requester records from a bid table.
///
/// Requires `FUE_ID`, `FBS` and `Bid` columns. A bid cell that does not
/// parse as a non-negative number is a data error, never coerced to zero.
pub fn load_bid_table(table: &Table) -> Result<Vec<FueRecord>, Box<dyn Error>> {
    let column = |name: &str| -> Result<usize, Box<dyn Error>> {
        table
            .header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| format!("Bid table is missing the '{}' column", name).into())
    };
    let fue_id_col = column("FUE_ID")?;
    let fbs_col = column("FBS")?;
    let bid_col = column("Bid")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let fue_id = row[fue_id_col].clone();
        let suffix = fue_id
            .get(FUE_ID_PREFIX_LEN..)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                format!(
                    "Bid table row {}: FUE_ID '{}' is too short to carry an owner number",
                    index + 1,
                    fue_id
                )
            })?;
        let owner: u32 = suffix.parse().map_err(|_| {
            format!(
                "Bid table row {}: FUE_ID '{}' has a non-numeric owner suffix",
                index + 1,
                fue_id
            )
        })?;

        let bid: f64 = row[bid_col].parse().map_err(|_| {
            format!(
                "Bid table row {}: bid '{}' is not a number",
                index + 1,
                row[bid_col]
            )
        })?;
        if !bid.is_finite() || bid < 0.0 {
            return Err(format!(
                "Bid table row {}: bid {} is not a non-negative real",
                index + 1,
                bid
            )
            .into());
        }

        records.push(FueRecord {
            fue_id,
            owner,
            fbs: row[fbs_col].clone(),
            bid,
        });
    }

    Ok(records)
}

/// Group requester owner numbers by FBS cohort, in first-appearance order
pub fn fbs_groups(records: &[FueRecord]) -> Vec<(String, Vec<u32>)> {
    let mut groups: Vec<(String, Vec<u32>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(fbs, _)| *fbs == record.fbs) {
            Some((_, members)) => members.push(record.owner),
            None => groups.push((record.fbs.clone(), vec![record.owner])),
        }
    }
    groups
}
