use std::path::Path;

use super::model::Table;
use super::schema::{classify, ColumnGroups};

/// The loaded dataset for one session: source name, table and column groups.
///
/// Built once after loading and borrowed by every component afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// File name of the source, e.g. `StressLevelDataset.csv`.
    pub name: String,
    pub table: Table,
    pub groups: ColumnGroups,
}

impl Dataset {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        let groups = classify(&table);
        Dataset {
            name: name.into(),
            table,
            groups,
        }
    }

    /// Name the dataset after the file it was read from.
    pub fn from_path(path: &Path, table: Table) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("dataset.csv");
        Dataset::new(name, table)
    }

    /// File name offered for the CSV download: the source name with a `.csv` extension.
    pub fn download_name(&self) -> String {
        Path::new(&self.name)
            .with_extension("csv")
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_name_keeps_stem() {
        let ds = Dataset::new("StressLevelDataset.parquet", Table::new(vec![]).unwrap());
        assert_eq!(ds.download_name(), "StressLevelDataset.csv");

        let ds = Dataset::new("StressLevelDataset.csv", Table::new(vec![]).unwrap());
        assert_eq!(ds.download_name(), "StressLevelDataset.csv");
    }
}
