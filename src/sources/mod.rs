pub mod nyt;
pub mod traits;
pub mod wire;

pub use nyt::NytSource;
pub use traits::NewsSource;
