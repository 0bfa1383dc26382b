pub mod user;
pub mod supplier;
pub mod document;
pub mod payment;
pub mod announcement;

// Re-export only the types we actually use
pub use user::{Role, User, UserResponse};
pub use supplier::{
    BankAccount, BankAccountInput, Currency, PersonType, QuickAddSupplier,
    RegisterSupplier, Supplier, SupplierResponse, SupplierStatus,
};
pub use document::{
    ApproveDocument, CreateDocument, DeliverableFile, Document, DocumentStatus,
    DocumentType, PaymentStatus, RejectDocument,
};
pub use payment::{PaymentRecord, UpdatePaymentRecord};
pub use announcement::{
    Announcement, AnnouncementAudience, CompanyDocument, CreateAnnouncement,
    CreateCompanyDocument, CreateFeedback, FeedbackSummary, FeedbackSurvey, Notification,
};
