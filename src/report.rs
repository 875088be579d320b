//! CSV reports. A report is a `Serialize` row type registered with `define_report!`; each
//! registered type gets its own file under the directory set in `ReportOptions`, named
//! `{file_prefix}{short_name}.csv`.
use crate::context::Context;
use crate::define_data_plugin;
use crate::error::HerdError;
use crate::hashing::{HashMap, HashMapExt};
use csv::Writer;
use log::trace;
use std::any::TypeId;
use std::cell::RefCell;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

pub trait Report: 'static {
    // Returns report type
    fn type_id(&self) -> TypeId;
    // Serializes the data with the correct writer
    fn serialize(&self, writer: &mut Writer<File>) -> Result<(), csv::Error>;
}

/// Use this macro to define a unique report type
#[macro_export]
macro_rules! define_report {
    ($name:ident) => {
        impl $crate::report::Report for $name {
            fn type_id(&self) -> std::any::TypeId {
                std::any::TypeId::of::<$name>()
            }

            fn serialize(
                &self,
                writer: &mut $crate::csv::Writer<std::fs::File>,
            ) -> Result<(), $crate::csv::Error> {
                writer.serialize(self)
            }
        }
    };
}
pub use define_report;

/// Where report files go and how existing files are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub overwrite: bool,
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> ReportOptions {
        ReportOptions {
            directory: PathBuf::from("."),
            file_prefix: String::new(),
            overwrite: false,
        }
    }

    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.directory = directory;
        self
    }

    pub fn file_prefix(&mut self, file_prefix: String) -> &mut ReportOptions {
        self.file_prefix = file_prefix;
        self
    }

    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new()
    }
}

struct ReportData {
    file_writers: RefCell<HashMap<TypeId, Writer<File>>>,
    options: ReportOptions,
}

// Registers a data container that stores
// * file_writers: Maps report type to file writer
// * options: Contains all the customizable filename options that the user supplies
define_data_plugin!(
    ReportPlugin,
    ReportData,
    ReportData {
        file_writers: RefCell::new(HashMap::new()),
        options: ReportOptions::new(),
    }
);

// Checks that the path is valid. Creates all parent directories if they do not
// exist, then creates the file. Called by `add_report`
fn create_report_file(path: &Path, overwrite: bool) -> Result<File, HerdError> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
        return Err(HerdError::ReportError(format!(
            "report files must be CSVs, got {}",
            path.display()
        )));
    }
    if path.exists() && !overwrite {
        return Err(HerdError::ReportError(format!(
            "{} already exists; allow overwriting to replace it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

pub trait ContextReportExt {
    /// Registers report type `T`, writing to `{directory}/{file_prefix}{short_name}.csv`.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::ReportError` if the file exists and overwriting is not allowed,
    /// and `HerdError::IoError` if the file or its directory cannot be created.
    fn add_report<T: Report + 'static>(&mut self, short_name: &str) -> Result<(), HerdError>;

    /// Writes a new row with columns following the fields of the report struct to the file
    /// registered for its type, and flushes it.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::ReportError` if `T` was never registered, or the underlying
    /// serialization or I/O error.
    fn send_report<T: Report>(&self, report: T) -> Result<(), HerdError>;

    /// Returns true if report type `T` has been registered.
    fn has_report<T: Report + 'static>(&self) -> bool;

    /// Returns the options used by subsequent calls to `add_report`.
    fn report_options(&mut self) -> &mut ReportOptions;
}

impl ContextReportExt for Context {
    fn add_report<T: Report + 'static>(&mut self, short_name: &str) -> Result<(), HerdError> {
        let data_container = self.get_data_mut(ReportPlugin);
        let options = &data_container.options;
        let path = options
            .directory
            .join(format!("{}{short_name}.csv", options.file_prefix));
        trace!("adding report {short_name} at {}", path.display());

        let file = create_report_file(&path, options.overwrite)?;
        let writer = Writer::from_writer(file);
        data_container
            .file_writers
            .borrow_mut()
            .insert(TypeId::of::<T>(), writer);
        Ok(())
    }

    fn send_report<T: Report>(&self, report: T) -> Result<(), HerdError> {
        let missing = || HerdError::ReportError("No writer found for the report type".to_string());
        // No data container will exist if no reports have been added
        let data_container = self.get_data(ReportPlugin).ok_or_else(missing)?;
        let mut writers = data_container.file_writers.borrow_mut();
        let writer = writers.get_mut(&report.type_id()).ok_or_else(missing)?;
        report.serialize(writer)?;
        writer.flush()?;
        Ok(())
    }

    fn has_report<T: Report + 'static>(&self) -> bool {
        self.get_data(ReportPlugin).is_some_and(|data_container| {
            data_container
                .file_writers
                .borrow()
                .contains_key(&TypeId::of::<T>())
        })
    }

    fn report_options(&mut self) -> &mut ReportOptions {
        &mut self.get_data_mut(ReportPlugin).options
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Serialize, Deserialize)]
    struct SampleReport {
        id: u32,
        value: String,
    }

    define_report!(SampleReport);

    #[test]
    fn add_and_send_report() {
        let mut context = Context::new();
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path();
        context.report_options().directory(path.to_path_buf());
        context.add_report::<SampleReport>("sample_report").unwrap();
        assert!(context.has_report::<SampleReport>());

        context
            .send_report(SampleReport {
                id: 1,
                value: "Test Value".to_string(),
            })
            .unwrap();

        let file_path = path.join("sample_report.csv");
        assert!(file_path.exists(), "CSV file should exist");

        let mut reader = csv::Reader::from_path(file_path).unwrap();
        let records: Vec<SampleReport> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].value, "Test Value");
    }

    #[test]
    fn prefix_and_nested_directory() {
        let mut context = Context::new();
        let temp_dir = tempdir().unwrap();
        let directory = temp_dir.path().join("nested").join("output");
        context
            .report_options()
            .directory(directory.clone())
            .file_prefix("run1_".to_string());
        context.add_report::<SampleReport>("sample").unwrap();
        assert!(directory.join("run1_sample.csv").exists());
    }

    #[test]
    fn refuses_to_overwrite() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("sample.csv");
        File::create(&path).unwrap();

        let mut context = Context::new();
        context
            .report_options()
            .directory(temp_dir.path().to_path_buf());
        let result = context.add_report::<SampleReport>("sample");
        assert!(matches!(result, Err(HerdError::ReportError(_))));

        context.report_options().overwrite(true);
        assert!(context.add_report::<SampleReport>("sample").is_ok());
    }

    #[test]
    fn only_csvs_allowed() {
        let temp_dir = tempdir().unwrap();
        let result = create_report_file(&temp_dir.path().join("sample_report.tsv"), false);
        match result {
            Err(HerdError::ReportError(msg)) => assert!(msg.contains("must be CSVs")),
            _ => panic!("Other file types beyond CSV are not allowed"),
        }
    }

    #[test]
    fn send_report_without_adding_report() {
        let context = Context::new();
        assert!(!context.has_report::<SampleReport>());
        let result = context.send_report(SampleReport {
            id: 1,
            value: "Test Value".to_string(),
        });
        assert!(matches!(result, Err(HerdError::ReportError(_))));
    }

    #[test]
    fn multiple_rows_keep_order() {
        let mut context = Context::new();
        let temp_dir = tempdir().unwrap();
        context
            .report_options()
            .directory(temp_dir.path().to_path_buf());
        context.add_report::<SampleReport>("rows").unwrap();
        context
            .send_report(SampleReport {
                id: 1,
                value: "Value,1".to_string(),
            })
            .unwrap();
        context
            .send_report(SampleReport {
                id: 2,
                value: "Value\n2".to_string(),
            })
            .unwrap();

        let mut reader = csv::Reader::from_path(temp_dir.path().join("rows.csv")).unwrap();
        let mut records = reader.deserialize::<SampleReport>();
        let first = records.next().unwrap().unwrap();
        assert_eq!((first.id, first.value.as_str()), (1, "Value,1"));
        let second = records.next().unwrap().unwrap();
        assert_eq!((second.id, second.value.as_str()), (2, "Value\n2"));
        assert!(records.next().is_none());
    }
}
