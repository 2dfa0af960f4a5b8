pub mod memory;
pub mod traits;

pub use memory::MemoryIdentityRepository;
pub use traits::IdentityRepository;
