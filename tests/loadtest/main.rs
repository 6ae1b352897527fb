//! Load testing integration tests.
//!
//! These tests run the create -> populate -> inspect -> clear -> drop
//! workflow against a live PostgreSQL server. They are skipped unless
//! `POSTGRESQL_CONNECTION_STRING` is set, e.g.
//!
//! ```bash
//! POSTGRESQL_CONNECTION_STRING="host=localhost user=postgres password=postgres dbname=postgres" \
//!   cargo test --test loadtest
//! ```

mod postgresql_loadtest;
