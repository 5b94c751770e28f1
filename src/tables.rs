use std::error::Error;
use std::fs::{self, create_dir_all};
use std::io::Write;
use std::path::Path;

/// A CSV table held as a header row plus string cells.
/// Parsing of individual cells is left to the loaders, which know which
/// columns are numeric.
#[derive(Debug, Clone)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Split one CSV line into fields, stripping optional surrounding quotes.
/// Cell values in this corpus never contain embedded commas.
fn split_fields(line: &str) -> Vec<String> {
    line.trim_end_matches('\r')
        .split(',')
        .map(|field| {
            let field = field.trim();
            field
                .strip_prefix('"')
                .and_then(|f| f.strip_suffix('"'))
                .unwrap_or(field)
                .to_string()
        })
        .collect()
}

/// Read a CSV table from disk. The first non-empty line is the header;
/// every following non-empty line becomes a row.
pub fn read_table(path: &Path) -> Result<Table, Box<dyn Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read table '{}': {}", path.display(), e))?;

    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
    let header = match lines.next() {
        Some(line) => split_fields(line),
        None => return Err(format!("Table '{}' is empty", path.display()).into()),
    };

    let mut rows = Vec::new();
    for line in lines {
        let fields = split_fields(line);
        if fields.len() != header.len() {
            return Err(format!(
                "Table '{}' row {} has {} fields, header has {}",
                path.display(),
                rows.len() + 1,
                fields.len(),
                header.len()
            )
            .into());
        }
        rows.push(fields);
    }

    Ok(Table { header, rows })
}

/// Write a CSV table, creating parent directories as needed
pub fn write_table(path: &Path, header: &[String], rows: &[Vec<String>]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", header.join(","))?;
    for row in rows {
        writeln!(file, "{}", row.join(","))?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("medina_tables_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let path = temp_path("round_trip.csv");
        let header = vec!["fue".to_string(), "MUE".to_string()];
        let rows = vec![
            vec!["fue 1".to_string(), "MUE_3".to_string()],
            vec!["fue 2".to_string(), "MUE_1".to_string()],
        ];
        write_table(&path, &header, &rows).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.header, header);
        assert_eq!(table.rows, rows);
    }

    #[test]
    fn test_quoted_fields_are_stripped() {
        let path = temp_path("quoted.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "\"fue\",\"MUE\"\n\"fue 1\",\"MUE_2\"\n").unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.header, vec!["fue", "MUE"]);
        assert_eq!(table.rows, vec![vec!["fue 1", "MUE_2"]]);
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let path = temp_path("ragged.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "a,b\n1,2\n1,2,3\n").unwrap();
        assert!(read_table(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_table(&temp_path("does_not_exist.csv")).is_err());
    }
}
