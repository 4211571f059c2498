//! Data registry: named tables and plots

use std::collections::BTreeMap;

use crate::error::Location;

use super::error::DataError;
use super::model::{Plot, Table};
use super::parser::{parse_data_file, DataDefinition};

/// Result of a name lookup
#[derive(Debug, Clone, Copy)]
pub enum DataItem<'a> {
    Table(&'a Table),
    Plot(&'a Plot),
}

/// Registry of tables and plots; names are unique across both kinds
#[derive(Debug, Default)]
pub struct DataRegistry {
    tables: BTreeMap<String, Table>,
    plots: BTreeMap<String, Plot>,
}

impl DataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a data file and register its tables and plots.
    ///
    /// All-or-nothing per file: on error the registry is left unchanged.
    /// Returns the number of definitions registered.
    pub fn load_str(&mut self, text: &str, origin: &str) -> Result<usize, DataError> {
        let definitions = parse_data_file(text, origin)?;

        let mut seen: BTreeMap<&str, &Location> = BTreeMap::new();
        for def in &definitions {
            let previous = self
                .origin_of(def.name())
                .or_else(|| seen.get(def.name()).copied());
            if let Some(previous) = previous {
                return Err(DataError::Duplicate {
                    name: def.name().to_string(),
                    location: def.origin().clone(),
                    previous: previous.clone(),
                });
            }
            seen.insert(def.name(), def.origin());
        }

        let count = definitions.len();
        for def in definitions {
            match def {
                DataDefinition::Table(table) => {
                    self.tables.insert(table.name.clone(), table);
                }
                DataDefinition::Plot(plot) => {
                    self.plots.insert(plot.name.clone(), plot);
                }
            }
        }
        Ok(count)
    }

    /// Register a single table
    pub fn register_table(&mut self, table: Table) -> Result<(), DataError> {
        self.check_free(&table.name, &table.origin)?;
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Register a single plot
    pub fn register_plot(&mut self, plot: Plot) -> Result<(), DataError> {
        self.check_free(&plot.name, &plot.origin)?;
        self.plots.insert(plot.name.clone(), plot);
        Ok(())
    }

    fn check_free(&self, name: &str, location: &Location) -> Result<(), DataError> {
        match self.origin_of(name) {
            Some(previous) => Err(DataError::Duplicate {
                name: name.to_string(),
                location: location.clone(),
                previous: previous.clone(),
            }),
            None => Ok(()),
        }
    }

    fn origin_of(&self, name: &str) -> Option<&Location> {
        self.tables
            .get(name)
            .map(|t| &t.origin)
            .or_else(|| self.plots.get(name).map(|p| &p.origin))
    }

    /// Look up a table or plot by name
    pub fn lookup(&self, name: &str) -> Option<DataItem<'_>> {
        self.tables
            .get(name)
            .map(DataItem::Table)
            .or_else(|| self.plots.get(name).map(DataItem::Plot))
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn plot(&self, name: &str) -> Option<&Plot> {
        self.plots.get(name)
    }

    /// Tables in name order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Plots in name order
    pub fn plots(&self) -> impl Iterator<Item = &Plot> {
        self.plots.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.plots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "^^t1\ncols=a;b\n&\n1 2\n\n$$p1\ncurve=c\n$$\n";

    #[test]
    fn test_load_and_lookup() {
        let mut registry = DataRegistry::new();
        assert_eq!(registry.load_str(DATA, "data.txt").expect("Should load"), 2);
        assert!(matches!(registry.lookup("t1"), Some(DataItem::Table(_))));
        assert!(matches!(registry.lookup("p1"), Some(DataItem::Plot(_))));
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_register_plot_shares_namespace() {
        let mut registry = DataRegistry::new();
        let origin = Location::new("code", 1);
        registry
            .register_plot(Plot::new("p", None, origin.clone()))
            .expect("Should register");
        let table = Table::new("p", None, BTreeMap::new(), vec![], origin);
        assert!(matches!(
            registry.register_table(table),
            Err(DataError::Duplicate { .. })
        ));
        assert!(matches!(registry.lookup("p"), Some(DataItem::Plot(_))));
    }

    #[test]
    fn test_duplicate_table_keeps_first() {
        let mut registry = DataRegistry::new();
        registry.load_str(DATA, "first.txt").expect("Should load");
        let result = registry.load_str("^^t1\ncols=z\n&\n9\n", "second.txt");
        match result {
            Err(DataError::Duplicate { previous, .. }) => assert_eq!(previous.file, "first.txt"),
            other => panic!("unexpected result: {:?}", other),
        }
        let table = registry.table("t1").expect("first table kept");
        assert_eq!(table.origin.file, "first.txt");
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_table_and_plot_share_namespace() {
        let mut registry = DataRegistry::new();
        let result = registry.load_str("^^x\ncols=a\n&\n1\n\n$$x\n$$\n", "d");
        assert!(matches!(result, Err(DataError::Duplicate { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_file_registers_nothing() {
        let mut registry = DataRegistry::new();
        let result = registry.load_str("^^ok\ncols=a\n&\n1\n\n$$bad\n.x=1\n$$\n", "d");
        assert!(matches!(result, Err(DataError::CurveContext { .. })));
        assert!(registry.table("ok").is_none());
    }
}
