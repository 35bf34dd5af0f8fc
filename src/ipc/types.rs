use crate::calc::GradeScale;
use crate::config::{Config, ScaleSource};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub scale_override: Option<GradeScale>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scale_override: None,
        }
    }

    pub fn active_scale(&self) -> &GradeScale {
        self.scale_override.as_ref().unwrap_or(&self.config.scale)
    }

    pub fn active_source(&self) -> ScaleSource {
        if self.scale_override.is_some() {
            ScaleSource::Override
        } else {
            self.config.source
        }
    }
}
