pub mod agreements;

pub use agreements::AgreementService;
