pub mod memory;
pub mod user;
pub mod verification;

pub use memory::InMemoryStore;
pub use user::UserRepository;
pub use verification::{VerificationStore, VerificationTransaction};
