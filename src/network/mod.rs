pub mod model;
pub mod network;
pub mod spec;

pub use model::{Model, Weights};
pub use network::{Branch, Network};
pub use spec::{BranchSpec, LayerSpec, NetworkSpec, TRIPLE_BRANCHES};
