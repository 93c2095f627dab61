pub mod apply;
pub mod check;
pub mod excerpt;
pub mod repair;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use excerpt::{excerpt, ExcerptArgs};
pub use repair::{repair, RepairArgs};
