use std::time::SystemTime;
use time::OffsetDateTime;
use ulid::Ulid;

///
/// IdProvider
///
/// Id generation is an explicit dependency of the repository, supplied at
/// construction. Tests inject deterministic providers; production uses
/// [`UlidProvider`].
///

pub trait IdProvider {
    /// Mint a fresh, globally unique id.
    fn generate(&self) -> String;

    /// Mint an id whose sort order reflects the given creation instant.
    fn generate_at(&self, at: OffsetDateTime) -> String {
        let _ = at;
        self.generate()
    }

    /// Whether the string is an id this provider could have minted.
    fn is_valid(&self, id: &str) -> bool;
}

///
/// UlidProvider
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UlidProvider;

impl IdProvider for UlidProvider {
    fn generate(&self) -> String {
        Ulid::new().to_string()
    }

    fn generate_at(&self, at: OffsetDateTime) -> String {
        Ulid::from_datetime(SystemTime::from(at)).to_string()
    }

    fn is_valid(&self, id: &str) -> bool {
        Ulid::from_string(id).is_ok()
    }
}
