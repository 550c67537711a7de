use sqlx::{Postgres, pool::PoolConnection};

use crate::{Error, Result, db::Db};

const RUN_LOCK_ID: i64 = 6_221_408;

/// Session-scoped advisory lock serializing full matching runs against one
/// store. The lock lives on a dedicated pooled connection and is released
/// explicitly (or by the session ending if the process dies).
pub struct RunLock {
	conn: PoolConnection<Postgres>,
}
impl RunLock {
	pub async fn acquire(db: &Db) -> Result<Self> {
		let mut conn = db.pool.acquire().await?;
		let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
			.bind(RUN_LOCK_ID)
			.fetch_one(&mut *conn)
			.await?;

		if !acquired {
			return Err(Error::RunActive);
		}

		Ok(Self { conn })
	}

	pub async fn release(mut self) -> Result<()> {
		sqlx::query("SELECT pg_advisory_unlock($1)")
			.bind(RUN_LOCK_ID)
			.execute(&mut *self.conn)
			.await?;

		Ok(())
	}
}
