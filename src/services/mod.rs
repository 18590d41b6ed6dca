// Services layer - Business logic and external collaborators
pub mod blob;
pub mod import_service;
pub mod mailer;
pub mod otp_service;
pub mod tabular;
pub mod token_service;

pub use blob::{BlobStore, FsBlobStore};
pub use import_service::{BulkImporter, ImportSummary};
pub use mailer::{MailSender, OutgoingMail, SmtpMailer};
pub use otp_service::OtpAuthenticator;
pub use tabular::{FileTabularReader, TabularReader};
pub use token_service::{TokenError, TokenService};
