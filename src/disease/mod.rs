// Leaf disease detection: image preprocessing, label set and the pretrained-model boundary.

pub mod classifier;
pub mod labels;
pub mod precautions;
pub mod tensor;

pub use classifier::{Diagnosis, LeafDiseaseClassifier, ModelId};
pub use labels::DiseaseLabels;
pub use tensor::{preprocess_image, ImageTensor, DEFAULT_IMAGE_SIZE};
