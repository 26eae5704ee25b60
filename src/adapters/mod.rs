// Adapters layer: concrete implementations for external systems.

pub mod tf_serving;

pub use tf_serving::TfServingBackend;
