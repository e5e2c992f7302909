pub mod aggregator;
pub mod billing;
pub mod catalog;
pub mod classifier;
pub mod detector;
pub mod normalizer;
pub mod receipt;
pub mod storage;

pub use billing::{BillingService, RenderedReceipt};
pub use catalog::{CatalogRegistry, PriceCatalog};
pub use classifier::{Classifier, FixedClassifier, RandomClassifier};
pub use detector::{Detector, HttpDetector, StaticDetector};
pub use normalizer::{normalize, normalize_merged, NormalizeOptions};
pub use receipt::{CsvReceipt, PdfReceipt, ReceiptFormatter};
pub use storage::FileStore;
