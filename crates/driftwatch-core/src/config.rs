use crate::error::{PipelineError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// TrainingConfig
// ---------------------------------------------------------------------------

/// Hyperparameters for the logistic classifier and the holdout split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default)]
    pub seed: u64,
    /// Inverse regularization strength.
    #[serde(default = "default_c")]
    pub c: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: u32,
    #[serde(default = "default_tol")]
    pub tol: f64,
}

fn default_test_size() -> f64 {
    0.2
}

fn default_c() -> f64 {
    1.0
}

fn default_max_iter() -> u32 {
    100
}

fn default_tol() -> f64 {
    1e-4
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            seed: 0,
            c: default_c(),
            max_iter: default_max_iter(),
            tol: default_tol(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project configuration, loaded once from `config.yaml` and passed by
/// reference to every stage. Relative paths resolve against `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_input")]
    pub input_folder_path: PathBuf,
    #[serde(default = "default_output")]
    pub output_folder_path: PathBuf,
    #[serde(default = "default_test_data")]
    pub test_data_path: PathBuf,
    #[serde(default = "default_model_output")]
    pub output_model_path: PathBuf,
    #[serde(default = "default_production")]
    pub prod_deployment_path: PathBuf,
    #[serde(default = "default_requirements")]
    pub requirements_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_packages_path: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(skip)]
    root: PathBuf,
}

fn default_version() -> u32 {
    1
}

fn default_input() -> PathBuf {
    PathBuf::from("sourcedata")
}

fn default_output() -> PathBuf {
    PathBuf::from("ingesteddata")
}

fn default_test_data() -> PathBuf {
    PathBuf::from("testdata")
}

fn default_model_output() -> PathBuf {
    PathBuf::from("models")
}

fn default_production() -> PathBuf {
    PathBuf::from("production_deployment")
}

fn default_requirements() -> PathBuf {
    PathBuf::from("requirements.txt")
}

impl Config {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            version: 1,
            input_folder_path: default_input(),
            output_folder_path: default_output(),
            test_data_path: default_test_data(),
            output_model_path: default_model_output(),
            prod_deployment_path: default_production(),
            requirements_path: default_requirements(),
            installed_packages_path: Some(PathBuf::from("installed.txt")),
            server: ServerConfig::default(),
            training: TrainingConfig::default(),
            root: root.into(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(PipelineError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let mut cfg: Config = serde_yaml::from_str(&data)?;
        cfg.root = root.to_path_buf();
        Ok(cfg)
    }

    pub fn save(&self) -> Result<()> {
        let path = paths::config_path(&self.root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path relative to the project root. Absolute paths pass through.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn input_dir(&self) -> PathBuf {
        self.resolve(&self.input_folder_path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_folder_path)
    }

    pub fn test_data_dir(&self) -> PathBuf {
        self.resolve(&self.test_data_path)
    }

    pub fn model_dir(&self) -> PathBuf {
        self.resolve(&self.output_model_path)
    }

    pub fn production_dir(&self) -> PathBuf {
        self.resolve(&self.prod_deployment_path)
    }

    pub fn requirements_file(&self) -> PathBuf {
        self.resolve(&self.requirements_path)
    }

    pub fn installed_packages_file(&self) -> Option<PathBuf> {
        self.installed_packages_path
            .as_deref()
            .map(|p| self.resolve(p))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.production_dir() == self.model_dir() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "output_model_path and prod_deployment_path must differ".to_string(),
            });
        }
        if self.production_dir() == self.output_dir() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "output_folder_path and prod_deployment_path must differ".to_string(),
            });
        }
        if self.input_dir() == self.output_dir() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "input and output folder are both '{}'; the consolidated dataset \
                     will be ingested as a source file",
                    self.input_folder_path.display()
                ),
            });
        }

        let t = &self.training;
        if !(t.test_size > 0.0 && t.test_size < 1.0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("training.test_size must be in (0, 1), got {}", t.test_size),
            });
        }
        if t.c <= 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("training.c must be positive, got {}", t.c),
            });
        }
        if t.max_iter == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "training.max_iter must be at least 1".to_string(),
            });
        }
        if t.tol <= 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "training.tol is {}; training will always run max_iter iterations",
                    t.tol
                ),
            });
        }

        warnings
    }

    /// Fail with `InvalidConfig` when validation reports any error-level entry.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidConfig(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
