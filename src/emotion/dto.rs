use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FaceAnalysis {
    pub emotion: String,
    pub confidence: f64,
    pub response: String,
    pub all_emotions: BTreeMap<String, f64>,
}
