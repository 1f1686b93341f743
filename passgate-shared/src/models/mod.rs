/// Data model for Passgate
///
/// # Models
///
/// - `user`: Identity, profile, the internal credential record and its
///   redacted public form
///
/// # Example
///
/// ```
/// use passgate_shared::models::user::Identity;
///
/// let identity = Identity::new("  Alice@Example.COM ");
/// assert_eq!(identity.as_str(), "alice@example.com");
/// ```

pub mod user;
