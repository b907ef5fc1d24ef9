pub mod checkpoint;
pub mod early_stopping;
pub mod monitor;
pub mod reduce_lr;
pub mod traits;

pub use checkpoint::ModelCheckpoint;
pub use early_stopping::EarlyStopping;
pub use monitor::{Mode, Monitor};
pub use reduce_lr::ReduceLrOnPlateau;
pub use traits::{CallbackAction, CallbackContext, CallbackList, TrainerCallback};
