use crate::config::AppConfig;
use crate::data::DataStore;
use crate::llm::{self, TextGenerator};
use crate::vision::{self, EmotionClassifier};
use std::{sync::Arc, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: DataStore,
    pub generator: Arc<dyn TextGenerator>,
    pub classifier: Arc<dyn EmotionClassifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = DataStore::new(config.data_dir.clone());
        store.seed_sample_data().await?;

        tokio::fs::create_dir_all(&config.upload_dir).await?;

        let generator = llm::from_config(&config.gemini)?;
        let classifier = vision::from_config(
            config.vision_url.as_deref(),
            Duration::from_secs(config.gemini.timeout_secs),
        )?;

        Ok(Self {
            config,
            store,
            generator,
            classifier,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: DataStore,
        generator: Arc<dyn TextGenerator>,
        classifier: Arc<dyn EmotionClassifier>,
    ) -> Self {
        Self {
            config,
            store,
            generator,
            classifier,
        }
    }
}
