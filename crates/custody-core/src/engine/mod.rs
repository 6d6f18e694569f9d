pub mod administer;

pub use administer::{score_with_policy, Administrator};
