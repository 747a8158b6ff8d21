//! One-time code generation

use rand::{rngs::OsRng, Rng};

use crate::domain::entities::verification_code::CODE_LENGTH;

/// Produces the codes mailed to users
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform 6-digit codes drawn from the operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureCodeGenerator;

impl CodeGenerator for SecureCodeGenerator {
    fn generate(&self) -> String {
        let n: u32 = OsRng.gen_range(0..1_000_000);
        format!("{:0width$}", n, width = CODE_LENGTH)
    }
}
