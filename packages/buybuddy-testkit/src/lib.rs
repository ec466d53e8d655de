//! Disposable Postgres databases and receipt fixtures for integration tests.

mod error;
mod seed;

pub use error::{Error, Result};
pub use seed::{ItemSeed, ReceiptSeed, seed_category, seed_receipt};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

const DSN_ENV: &str = "BUYBUDDY_PG_DSN";
// Databases tried, in order, for CREATE/DROP DATABASE.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A `buybuddy_test_*` database created on the server behind `BUYBUDDY_PG_DSN`.
///
/// Call [`TestDatabase::cleanup`] at the end of a test. A value dropped without it still
/// removes the database from a helper thread.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse {DSN_ENV}: {err}.")))?;
		let (maintenance, mut conn) = open_maintenance(&base).await?;
		let name = format!("buybuddy_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await.map_err(|err| {
			Error::Message(format!("Failed to create test database {name}: {err}."))
		})?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.maintenance, &self.name).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = std::mem::take(&mut self.name);
		let maintenance = self.maintenance.clone();
		let handle = thread::spawn(move || {
			let outcome = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(err.to_string()))
				.and_then(|runtime| runtime.block_on(drop_database(&maintenance, &name)));

			if let Err(err) = outcome {
				eprintln!("Failed to drop test database {name}: {err}.");
			}
		});
		let _ = handle.join();
	}
}

/// The base DSN for database-backed tests, if configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn open_maintenance(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failures = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failures.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!(
		"Failed to connect to a maintenance database ({}).",
		failures.join("; ")
	)))
}

async fn drop_database(maintenance: &PgConnectOptions, name: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#))
		.execute(&mut conn)
		.await?;

	Ok(())
}
