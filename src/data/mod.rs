pub mod csv;
pub mod dataset;
pub mod encoding;
pub mod kfold;
pub mod split;
pub mod synthetic;

pub use dataset::Dataset;
pub use encoding::{argmax, from_categorical, to_categorical};
pub use kfold::{Fold, KFold};
pub use split::train_test_split;
