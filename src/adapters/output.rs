use crate::config::LoadConfig;
use crate::domain::model::CourseRecord;
use crate::domain::ports::{Destination, Emitter};
use crate::utils::error::{Result, ScrapeError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const BASE_CSV_COLUMNS: [&str; 4] = ["code", "title", "url", "description"];

fn require_code(record: &CourseRecord) -> Result<()> {
    if record.code.as_str().is_empty() {
        return Err(ScrapeError::write("refusing to write a record without a course code"));
    }
    Ok(())
}

/// Writes one file per configured format into a local directory.
#[derive(Debug, Clone)]
pub struct LocalDestination {
    base_path: PathBuf,
    config: LoadConfig,
}

impl LocalDestination {
    pub fn new(config: &LoadConfig) -> Self {
        Self {
            base_path: PathBuf::from(&config.output_path),
            config: config.clone(),
        }
    }

    /// Paths that `open` would create, in format order.
    pub fn planned_paths(&self) -> Vec<PathBuf> {
        self.config
            .output_formats
            .iter()
            .filter_map(|format| match format.as_str() {
                "csv" => Some(self.base_path.join(&self.config.filenames.csv)),
                "json" => Some(self.base_path.join(&self.config.filenames.json)),
                _ => None,
            })
            .collect()
    }
}

impl Destination for LocalDestination {
    fn open(&self) -> Result<Box<dyn Emitter>> {
        fs::create_dir_all(&self.base_path)?;

        let mut emitters: Vec<Box<dyn Emitter>> = Vec::new();
        for format in &self.config.output_formats {
            match format.as_str() {
                "csv" => {
                    let path = self.base_path.join(&self.config.filenames.csv);
                    emitters.push(Box::new(CsvEmitter::open(&path, &self.config.csv_columns)?));
                }
                "json" => {
                    let path = self.base_path.join(&self.config.filenames.json);
                    emitters.push(Box::new(JsonEmitter::open(&path)?));
                }
                other => {
                    return Err(ScrapeError::InvalidConfigValueError {
                        field: "load.output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            }
        }

        tracing::debug!("Opened {} output file(s) in {}", emitters.len(), self.base_path.display());
        Ok(Box::new(EmitterSet { emitters }))
    }
}

/// Fans every record out to several emitters.
pub struct EmitterSet {
    emitters: Vec<Box<dyn Emitter>>,
}

impl Emitter for EmitterSet {
    fn append(&mut self, record: &CourseRecord) -> Result<()> {
        for emitter in &mut self.emitters {
            emitter.append(record)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // 全部關閉後再回報第一個錯誤
        let mut first_error = None;
        for emitter in &mut self.emitters {
            if let Err(e) = emitter.close() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn paths(&self) -> Vec<String> {
        self.emitters.iter().flat_map(|e| e.paths()).collect()
    }
}

/// `code,title,url,description` plus configured columns from `other_fields`.
pub struct CsvEmitter {
    writer: Option<csv::Writer<File>>,
    columns: Vec<String>,
    path: PathBuf,
}

impl CsvEmitter {
    pub fn open(path: &Path, extra_columns: &[String]) -> Result<Self> {
        let mut columns: Vec<String> = BASE_CSV_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(
            extra_columns
                .iter()
                .filter(|c| !BASE_CSV_COLUMNS.contains(&c.as_str()))
                .cloned(),
        );

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&columns)?;

        Ok(Self {
            writer: Some(writer),
            columns,
            path: path.to_path_buf(),
        })
    }
}

impl Emitter for CsvEmitter {
    fn append(&mut self, record: &CourseRecord) -> Result<()> {
        require_code(record)?;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ScrapeError::write("CSV output is already closed"))?;

        let row: Vec<&str> = self
            .columns
            .iter()
            .map(|column| record.field(column).unwrap_or(""))
            .collect();
        writer.write_record(&row)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn paths(&self) -> Vec<String> {
        vec![self.path.display().to_string()]
    }
}

/// A pretty-printed JSON array, written one record at a time.
pub struct JsonEmitter {
    writer: Option<BufWriter<File>>,
    written: usize,
    path: PathBuf,
}

impl JsonEmitter {
    pub fn open(path: &Path) -> Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(b"[")?;

        Ok(Self {
            writer: Some(writer),
            written: 0,
            path: path.to_path_buf(),
        })
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.write_all(b"\n]\n")?;
            writer.flush()?;
        }
        Ok(())
    }
}

impl Emitter for JsonEmitter {
    fn append(&mut self, record: &CourseRecord) -> Result<()> {
        require_code(record)?;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ScrapeError::write("JSON output is already closed"))?;

        let separator: &[u8] = if self.written == 0 { b"\n" } else { b",\n" };
        writer.write_all(separator)?;
        serde_json::to_writer_pretty(&mut *writer, record)?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.finish()
    }

    fn paths(&self) -> Vec<String> {
        vec![self.path.display().to_string()]
    }
}

impl Drop for JsonEmitter {
    fn drop(&mut self) {
        // 中途中止時仍輸出合法的 JSON 陣列
        if let Err(e) = self.finish() {
            tracing::warn!("Failed to finalise {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CourseCode;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record(code: &str, title: &str) -> CourseRecord {
        let mut other_fields = BTreeMap::new();
        other_fields.insert("hours".to_string(), "3 Lectures".to_string());
        CourseRecord {
            code: CourseCode::parse(code).unwrap(),
            title: title.to_string(),
            url: format!("https://calendar.example.edu/courses/{}", code.to_lowercase()),
            description: "Line one, with a comma\nline two".to_string(),
            other_fields,
        }
    }

    fn load_config(dir: &TempDir, formats: &[&str]) -> LoadConfig {
        LoadConfig {
            output_path: dir.path().to_str().unwrap().to_string(),
            output_formats: formats.iter().map(|f| f.to_string()).collect(),
            ..LoadConfig::default()
        }
    }

    #[test]
    fn test_csv_rows_follow_append_order() {
        let dir = TempDir::new().unwrap();
        let destination = LocalDestination::new(&load_config(&dir, &["csv"]));

        let mut emitter = destination.open().unwrap();
        emitter.append(&record("CS102", "Data Structures")).unwrap();
        emitter.append(&record("CS101", "Intro")).unwrap();
        emitter.close().unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("courses.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["code", "title", "url", "description", "hours", "prerequisite", "exclusion"]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "CS102");
        assert_eq!(&rows[1][0], "CS101");
        assert_eq!(&rows[0][3], "Line one, with a comma\nline two");
        assert_eq!(&rows[0][4], "3 Lectures");
        assert_eq!(&rows[0][5], "");
    }

    #[test]
    fn test_json_output_is_valid_array() {
        let dir = TempDir::new().unwrap();
        let destination = LocalDestination::new(&load_config(&dir, &["json"]));

        let mut emitter = destination.open().unwrap();
        emitter.append(&record("CS101", "Intro")).unwrap();
        emitter.append(&record("CS102", "Data Structures")).unwrap();
        emitter.close().unwrap();
        emitter.close().unwrap();

        let content = fs::read_to_string(dir.path().join("courses.json")).unwrap();
        let parsed: Vec<CourseRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![record("CS101", "Intro"), record("CS102", "Data Structures")]);
    }

    #[test]
    fn test_empty_json_output() {
        let dir = TempDir::new().unwrap();
        let destination = LocalDestination::new(&load_config(&dir, &["json"]));

        destination.open().unwrap().close().unwrap();

        let content = fs::read_to_string(dir.path().join("courses.json")).unwrap();
        let parsed: Vec<CourseRecord> = serde_json::from_str(&content).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_dropped_emitter_still_finalises_json() {
        let dir = TempDir::new().unwrap();
        let destination = LocalDestination::new(&load_config(&dir, &["csv", "json"]));

        {
            let mut emitter = destination.open().unwrap();
            emitter.append(&record("CS101", "Intro")).unwrap();
        }

        let content = fs::read_to_string(dir.path().join("courses.json")).unwrap();
        let parsed: Vec<CourseRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);

        let csv_content = fs::read_to_string(dir.path().join("courses.csv")).unwrap();
        assert!(csv_content.contains("CS101"));
    }

    #[test]
    fn test_record_without_code_is_rejected() {
        let dir = TempDir::new().unwrap();
        let destination = LocalDestination::new(&load_config(&dir, &["csv", "json"]));
        let mut nameless = record("CS101", "Intro");
        nameless.code = CourseCode::unchecked("");

        let mut emitter = destination.open().unwrap();
        let err = emitter.append(&nameless).unwrap_err();
        assert!(matches!(err, ScrapeError::Write { .. }));
        emitter.close().unwrap();

        let content = fs::read_to_string(dir.path().join("courses.json")).unwrap();
        let parsed: Vec<CourseRecord> = serde_json::from_str(&content).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_append_after_close_is_write_error() {
        let dir = TempDir::new().unwrap();
        let destination = LocalDestination::new(&load_config(&dir, &["csv"]));

        let mut emitter = destination.open().unwrap();
        emitter.close().unwrap();
        let err = emitter.append(&record("CS101", "Intro")).unwrap_err();
        assert!(matches!(err, ScrapeError::Write { .. }));
    }

    #[test]
    fn test_paths_and_planned_paths_agree() {
        let dir = TempDir::new().unwrap();
        let destination = LocalDestination::new(&load_config(&dir, &["json", "csv"]));

        let planned: Vec<String> = destination
            .planned_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let mut emitter = destination.open().unwrap();
        assert_eq!(emitter.paths(), planned);
        emitter.close().unwrap();
    }
}
