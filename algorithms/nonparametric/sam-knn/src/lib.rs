//! SAM-kNN: a k-nearest-neighbour classifier for data streams with a
//! self-adjusting short-term memory and a compressed long-term memory.
//!
//! ```no_run
//! use ndarray::array;
//! use sam_knn::{SamKnn, SamKnnConfig};
//!
//! let mut model: SamKnn<u8> = SamKnn::new(SamKnnConfig::default()).unwrap();
//! let x = array![0.3, 0.7];
//! let predicted = model.predict(x.view()).unwrap();
//! model.partial_fit(x.view(), 1).unwrap();
//! # let _ = predicted;
//! ```

mod config;
mod error;
mod sam;
mod stm_sizer;

pub use config::{ConfigError, SamKnnConfig, StmSizeAdaption};
pub use error::SamKnnError;
pub use k_nn::Weighting;
pub use sam::{Label, MemoryChoice, SamKnn};
