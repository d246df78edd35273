//! Sentence embeddings using Model2Vec static models

use crate::error::{Result, SurveyError};
use anyhow::Context;
use log::info;
use model2vec_rs::model::StaticModel;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub trait SentenceEncoder {
    fn encode(&self, texts: &[String]) -> Vec<Vec<f32>>;
}

impl SentenceEncoder for StaticModel {
    fn encode(&self, texts: &[String]) -> Vec<Vec<f32>> {
        StaticModel::encode(self, texts)
    }
}

pub type ModelLoader = Box<dyn Fn(&str) -> Result<Arc<dyn SentenceEncoder>>>;

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingBatch {
    pub model: String,
    pub dimension: usize,
    pub texts: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
}

/// Loads each model once and keeps it for the rest of the run.
pub struct ModelCache {
    default_model: String,
    models: HashMap<String, Arc<dyn SentenceEncoder>>,
    loader: ModelLoader,
}

impl ModelCache {
    /// Cache backed by Model2Vec, from a Hugging Face repo id or a local folder.
    pub fn new(default_model: impl Into<String>) -> Self {
        Self::with_loader(default_model, Box::new(load_static_model))
    }

    pub fn with_loader(default_model: impl Into<String>, loader: ModelLoader) -> Self {
        Self {
            default_model: default_model.into(),
            models: HashMap::new(),
            loader,
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn get_model(&mut self, name: Option<&str>) -> Result<Arc<dyn SentenceEncoder>> {
        let name = name.unwrap_or(&self.default_model).to_string();
        if let Some(model) = self.models.get(&name) {
            return Ok(Arc::clone(model));
        }

        let start = Instant::now();
        let model = (self.loader)(&name)?;
        info!("Loaded embedding model {} in {:.2?}", name, start.elapsed());

        self.models.insert(name, Arc::clone(&model));
        Ok(model)
    }

    pub fn embed_texts(&mut self, texts: &[String], name: Option<&str>) -> Result<EmbeddingBatch> {
        if texts.is_empty() {
            return Err(SurveyError::InvalidInput("No texts to embed".to_string()));
        }

        let model_name = name.unwrap_or(&self.default_model).to_string();
        let model = self.get_model(Some(&model_name))?;
        let embeddings = model.encode(texts);
        if embeddings.len() != texts.len() {
            return Err(SurveyError::Embedding(format!(
                "Model returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        Ok(EmbeddingBatch {
            model: model_name,
            dimension: embeddings.first().map_or(0, Vec::len),
            texts: texts.to_vec(),
            embeddings,
        })
    }

    pub fn cached_models(&self) -> usize {
        self.models.len()
    }
}

fn load_static_model(name: &str) -> Result<Arc<dyn SentenceEncoder>> {
    let model = StaticModel::from_pretrained(name, None, None, None)
        .with_context(|| format!("Failed to load model '{}'", name))?;
    Ok(Arc::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct LengthEncoder;

    impl SentenceEncoder for LengthEncoder {
        fn encode(&self, texts: &[String]) -> Vec<Vec<f32>> {
            texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect()
        }
    }

    fn counting_cache() -> (ModelCache, Rc<Cell<usize>>) {
        let loads = Rc::new(Cell::new(0));
        let counter = Rc::clone(&loads);
        let cache = ModelCache::with_loader(
            "test-model",
            Box::new(move |name: &str| {
                if name == "broken" {
                    return Err(SurveyError::Embedding("no such model".to_string()));
                }
                counter.set(counter.get() + 1);
                Ok(Arc::new(LengthEncoder) as Arc<dyn SentenceEncoder>)
            }),
        );
        (cache, loads)
    }

    #[test]
    fn test_model_loaded_once_per_name() {
        let (mut cache, loads) = counting_cache();
        cache.get_model(None).unwrap();
        cache.get_model(Some("test-model")).unwrap();
        assert_eq!(loads.get(), 1);

        cache.get_model(Some("other")).unwrap();
        assert_eq!(loads.get(), 2);
        assert_eq!(cache.cached_models(), 2);
    }

    #[test]
    fn test_embed_texts_reports_dimension() {
        let (mut cache, _) = counting_cache();
        let batch = cache
            .embed_texts(&["rust".to_string(), "python".to_string()], None)
            .unwrap();
        assert_eq!(batch.model, "test-model");
        assert_eq!(batch.dimension, 2);
        assert_eq!(batch.embeddings[1][0], 6.0);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let (mut cache, _) = counting_cache();
        assert!(cache.get_model(Some("broken")).is_err());
        assert_eq!(cache.cached_models(), 0);
        assert!(cache.embed_texts(&[], None).is_err());
    }
}
