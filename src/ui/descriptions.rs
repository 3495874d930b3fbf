//! Static descriptive content for each diagnostic class
//!
//! Keys are the exact labels the prediction endpoint returns.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptionEntry {
    pub about: &'static str,
    /// Period-delimited clinical indicators
    pub signs: &'static str,
    /// Comma-delimited visual pattern tags
    pub visual_patterns: &'static str,
    pub deep_learning_insights: &'static str,
}

impl DescriptionEntry {
    /// Clinical indicators, one clause each
    pub fn sign_items(&self) -> Vec<&'static str> {
        split_items(self.signs, ". ")
    }

    /// Visual pattern tags, trimmed
    pub fn pattern_tags(&self) -> Vec<&'static str> {
        split_items(self.visual_patterns, ", ")
    }
}

fn split_items(text: &'static str, separator: &str) -> Vec<&'static str> {
    text.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

const NORMAL: DescriptionEntry = DescriptionEntry {
    about: "A normal chest radiograph represents healthy pulmonary anatomy, where lung fields appear clear, heart and diaphragm borders are distinct, and there are no pathological opacities or structural abnormalities. This serves as a baseline for comparison with abnormal conditions.",
    signs: "Clear and symmetrical lung fields, sharp costophrenic and cardiophrenic angles, distinct cardiac and diaphragmatic silhouettes, normal vascular markings.",
    visual_patterns: "Uniform grayscale texture, no abnormal density, clear margins, no asymmetry in lung zones.",
    deep_learning_insights: "Deep learning models use edge detection and symmetry analysis to recognize the absence of anomalies. Feature maps focus on high-contrast borders and evenly distributed texture patterns, helping to differentiate from pathological images.",
};

const VIRAL_PNEUMONIA: DescriptionEntry = DescriptionEntry {
    about: "Viral pneumonia is a lung infection caused by viruses, leading to inflammation and damage in the alveoli. The radiographic appearance may be subtle early on but can progress to show diffuse or focal opacities, primarily in the lower zones. Unlike bacterial pneumonia, viral cases often show bilateral involvement and ground-glass opacities.",
    signs: "Patchy or diffuse increased opacities, especially in lower lobes; bilateral infiltrates, air bronchograms, and ground-glass patterns.",
    visual_patterns: "Non-homogeneous hazy opacities, reticular patterns, bilateral lung involvement with cloud-like textures.",
    deep_learning_insights: "Models trained on viral pneumonia datasets learn to detect texture anomalies and irregular opacities across lung fields. Attention mechanisms help localize subtle ground-glass appearances and distinguish from bacterial infections.",
};

const LUNG_OPACITY: DescriptionEntry = DescriptionEntry {
    about: "This category often includes radiological findings from chronic infections like Tuberculosis (TB). TB primarily affects the upper lobes and may cause structural lung damage, such as cavitations and fibrosis. Radiographs exhibit focal or diffuse opacities, which can overlap with malignancies or other chronic diseases.",
    signs: "Upper lobe predominant opacities, cavitary lesions, fibrotic bands, volume loss, calcified granulomas, and nodular patterns.",
    visual_patterns: "Dense upper lobe opacities, hollow cavities with thick walls, linear fibrotic streaks, and speckled nodules.",
    deep_learning_insights: "Yolo Deeplearning trained on TB datasets detect complex visual signatures such as cavitation edges, calcifications, and fibrotic textures. These models leverage hierarchical feature extraction to isolate region-specific abnormalities.",
};

/// Look up the entry for a class label (case and spelling sensitive)
pub fn lookup(class: &str) -> Option<&'static DescriptionEntry> {
    match class {
        "Normal" => Some(&NORMAL),
        "Viral Pneumonia" => Some(&VIRAL_PNEUMONIA),
        "Lung_Opacity" => Some(&LUNG_OPACITY),
        _ => None,
    }
}
