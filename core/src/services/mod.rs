//! Business services containing domain logic and use cases.

pub mod clock;
pub mod password;
pub mod registration;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use password::PasswordPolicy;
pub use registration::RegistrationService;
pub use token::{IssuedPreAuthToken, PreAuthTokenIssuer};
pub use verification::{
    CodeCleanupService, CodeGenerator, CodeMessage, Mailer, PreVerifyOutcome,
    RequestCodeOutcome, SecureCodeGenerator, VerificationService, VerificationServiceConfig,
    VerifyCodeOutcome,
};
