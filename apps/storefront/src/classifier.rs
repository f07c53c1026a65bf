//! # Visual Classifier
//!
//! Boundary to whatever turns a photo into a [`VisualDetection`]. The
//! storefront only ranks what the classifier returns; it never looks at
//! pixels itself.

use async_trait::async_trait;

use loom_core::search::VisualDetection;

/// Photo in, catalog type and attributes out.
///
/// `None` means the classifier could not tell. Callers fall back to the
/// unranked catalog head in that case.
#[async_trait]
pub trait VisualClassifier: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> Option<VisualDetection>;
}

/// Classifier that always answers the same thing. Used by the CLI when no
/// real classifier is wired in, and by tests.
#[derive(Debug, Clone, Default)]
pub struct FixedClassifier {
    detection: Option<VisualDetection>,
}

impl FixedClassifier {
    pub fn new(detection: VisualDetection) -> Self {
        Self {
            detection: Some(detection),
        }
    }

    /// A classifier that never recognises anything.
    pub fn blind() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VisualClassifier for FixedClassifier {
    async fn analyze(&self, image: &[u8]) -> Option<VisualDetection> {
        if image.is_empty() {
            return None;
        }
        self.detection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::ProductType;

    #[tokio::test]
    async fn test_fixed_classifier() {
        let detection = VisualDetection {
            catalog_type: ProductType::Hardware,
            ..VisualDetection::default()
        };
        let classifier = FixedClassifier::new(detection.clone());

        assert_eq!(classifier.analyze(b"jpeg").await, Some(detection));
        assert_eq!(classifier.analyze(b"").await, None);
        assert_eq!(FixedClassifier::blind().analyze(b"jpeg").await, None);
    }
}
