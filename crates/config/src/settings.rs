// Application settings
// Loaded from ~/.config/millcard/settings.toml

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use millcard_press::{ShiftTable, ShiftWindow, DEFAULT_BALE_TYPES, DEFAULT_SUPERVISORS};
use millcard_recon::{ReconError, Vocabulary, VocabularyConfig};

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    Io { path: PathBuf, message: String },
    /// TOML syntax or type error.
    Parse { path: PathBuf, message: String },
    /// Values parse but don't make sense together.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ReconError> for ConfigError {
    fn from(e: ReconError) -> Self {
        Self::Invalid(e.to_string())
    }
}

/// Where plan and card histories are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// One workbook holding the plan sheet and one sheet per card.
    Workbook(PathBuf),
    /// A directory of CSV exports: one plan file and one file per card.
    CsvDir(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub workbook: Option<PathBuf>,
    pub csv_dir: Option<PathBuf>,
    pub plan_sheet: String,
    /// `{card}` is replaced by the card number.
    pub card_sheet_pattern: String,
    pub plan_file: String,
    /// `{card}` is replaced by the card number.
    pub card_file_pattern: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            workbook: None,
            csv_dir: None,
            plan_sheet: "ServicePlan".into(),
            card_sheet_pattern: "Card{card}".into(),
            plan_file: "plan.csv".into(),
            card_file_pattern: "card_{card}.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PressSettings {
    /// Bale log (CSV or workbook).
    pub log: Option<PathBuf>,
    /// Sheet of the bale log when it is a workbook. First sheet if unset.
    pub sheet: Option<String>,
    pub shifts: Vec<ShiftWindow>,
    pub night_shift: String,
    pub supervisors: Vec<String>,
    pub bale_types: Vec<String>,
}

impl Default for PressSettings {
    fn default() -> Self {
        let table = ShiftTable::default();
        Self {
            log: None,
            sheet: None,
            shifts: table.windows,
            night_shift: table.fallback,
            supervisors: DEFAULT_SUPERVISORS.iter().map(|s| s.to_string()).collect(),
            bale_types: DEFAULT_BALE_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PressSettings {
    pub fn shift_table(&self) -> ShiftTable {
        ShiftTable::new(self.shifts.clone(), self.night_shift.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub vocabulary: VocabularyConfig,
    pub press: PressSettings,

    /// Directory the settings file was read from; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("millcard")
            .join("settings.toml")
    }

    /// Load an explicit settings file, or the default one if it exists.
    /// Without either, built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    debug!(path = %path.display(), "no settings file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut settings = Self::from_toml(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        settings.base_dir = path.parent().map(Path::to_path_buf);
        settings.validate()?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vocabulary()?;
        if self.source.workbook.is_some() && self.source.csv_dir.is_some() {
            return Err(ConfigError::Invalid(
                "set only one of source.workbook and source.csv_dir".into(),
            ));
        }
        for pattern in [&self.source.card_sheet_pattern, &self.source.card_file_pattern] {
            if !pattern.contains("{card}") {
                return Err(ConfigError::Invalid(format!(
                    "pattern '{pattern}' has no {{card}} placeholder"
                )));
            }
        }
        for w in &self.press.shifts {
            if w.start >= w.end || w.end > 24 {
                return Err(ConfigError::Invalid(format!(
                    "shift '{}' has an empty or out-of-day window {}-{}",
                    w.name, w.start, w.end
                )));
            }
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> Result<Vocabulary, ConfigError> {
        Ok(Vocabulary::from_config(&self.vocabulary)?)
    }

    /// Configured data source with relative paths resolved.
    pub fn data_source(&self) -> Option<DataSource> {
        if let Some(ref path) = self.source.workbook {
            return Some(DataSource::Workbook(self.resolve(path)));
        }
        self.source
            .csv_dir
            .as_ref()
            .map(|dir| DataSource::CsvDir(self.resolve(dir)))
    }

    pub fn press_log(&self) -> Option<PathBuf> {
        self.press.log.as_ref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.source.plan_sheet, "ServicePlan");
        assert_eq!(settings.source.card_sheet_pattern, "Card{card}");
        assert_eq!(settings.press.shift_table().shift_for_hour(9), "أول");
        assert!(settings.data_source().is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let settings = Settings::from_toml(
            r#"
[source]
csv_dir = "exports"

[vocabulary]
serviced_by = ["Fitter"]

[[press.shifts]]
name = "day"
start = 6
end = 18
"#,
        )
        .unwrap();
        assert_eq!(settings.source.plan_file, "plan.csv");
        assert_eq!(settings.data_source(), Some(DataSource::CsvDir("exports".into())));
        assert_eq!(settings.vocabulary.serviced_by, vec!["Fitter".to_string()]);
        assert!(!settings.vocabulary.date.is_empty());
        let shifts = settings.press.shift_table();
        assert_eq!(shifts.shift_for_hour(20), "ثالث");
    }

    #[test]
    fn relative_paths_resolve_against_settings_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[source]\nworkbook = \"cards.xlsx\"\n[press]\nlog = \"/abs/bales.csv\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(
            settings.data_source(),
            Some(DataSource::Workbook(dir.path().join("cards.xlsx")))
        );
        assert_eq!(settings.press_log(), Some(PathBuf::from("/abs/bales.csv")));
    }

    #[test]
    fn both_sources_is_invalid() {
        let settings = Settings::from_toml("[source]\nworkbook = \"a.xlsx\"\ncsv_dir = \"b\"\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn pattern_without_placeholder_is_invalid() {
        let settings = Settings::from_toml("[source]\ncard_sheet_pattern = \"Card\"\n").unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("{card}"));
    }

    #[test]
    fn bad_vocabulary_is_invalid() {
        let settings = Settings::from_toml("[vocabulary]\nmax_tons = []\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/millcard.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn syntax_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[source\n").unwrap();
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("settings.toml"));
    }
}
