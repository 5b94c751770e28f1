use std::error::Error;
use std::path::Path;

/// Identity of one allocation scenario, parsed out of a gain-table path.
///
/// Gain files are named `Te_<MM><FF>_<trial>.csv` where `<MM>` is the
/// two-digit channel (MUE) count and `<FF>` the remaining digits of the
/// requester (FUE) count. A name that does not fit the pattern is a hard
/// error: the batch cannot tell what table shapes to expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub num_mue: usize,
    pub num_fue: usize,
    pub trial: usize,
}

/// Number of leading digits that encode the MUE count in a file name
const MUE_DIGITS: usize = 2;

impl Scenario {
    /// Parse a scenario identity from a gain-table path
    pub fn from_gain_path(path: &str) -> Result<Scenario, Box<dyn Error>> {
        let file_name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| format!("Gain file path '{}' has no file name", path))?;

        let stem = file_name
            .strip_prefix("Te_")
            .and_then(|rest| rest.strip_suffix(".csv"))
            .ok_or_else(|| {
                format!(
                    "Gain file name '{}' does not match the Te_<sizes>_<trial>.csv pattern",
                    file_name
                )
            })?;

        let (sizes, trial) = stem.split_once('_').ok_or_else(|| {
            format!("Gain file name '{}' is missing the trial index", file_name)
        })?;

        if sizes.len() <= MUE_DIGITS || !sizes.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "Gain file name '{}' does not encode <mue><fue> counts",
                file_name
            )
            .into());
        }

        let num_mue: usize = sizes[..MUE_DIGITS].parse()?;
        let num_fue: usize = sizes[MUE_DIGITS..].parse()?;
        let trial: usize = trial
            .parse()
            .map_err(|_| format!("Gain file name '{}' has a non-numeric trial index", file_name))?;

        Ok(Scenario {
            num_mue,
            num_fue,
            trial,
        })
    }

    /// Canonical gain-file name, used as the key in the batch summary
    pub fn gain_file_name(&self) -> String {
        format!("Te_{}{}_{}.csv", self.num_mue, self.num_fue, self.trial)
    }

    /// File name of this scenario's assignment output table
    pub fn output_file_name(&self) -> String {
        format!("output_{}{}_{}.csv", self.num_mue, self.num_fue, self.trial)
    }

    /// The `<MM><FF>_<trial>` portion shared by this scenario's input files
    pub fn file_tag(&self) -> String {
        format!("{}{}_{}", self.num_mue, self.num_fue, self.trial)
    }
}
