/// PostgreSQL plumbing for [`crate::store::postgres::PgUserStore`]
///
/// - `pool`: connection pool with a startup probe
/// - `migrations`: embedded schema migrations

pub mod migrations;
pub mod pool;
