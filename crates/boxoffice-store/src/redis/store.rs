//! Redis coordination-store implementation using Lua scripts for atomicity.
//!
//! Operations that must be indivisible under concurrent access (counter
//! check-and-decrement, all-or-nothing seat multi-lease, waiting-queue
//! pop-and-admit) each run as a single server-side script.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use boxoffice_core::error::AppError;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::store::CoordinationStore;

use super::client::RedisClient;
use super::expiry::spawn_expiry_listener;

/// Interval between retries while waiting for a contended multi-lease.
const LEASE_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Lua script for the atomic counter check-and-decrement.
///
/// KEYS[1] = counter key
/// ARGV[1] = requested amount
///
/// Returns 1 if the counter held at least the requested amount and was
/// decremented, 0 otherwise. An uninitialized counter reads as 0.
const DECREMENT_IF_ENOUGH_SCRIPT: &str = r#"
    local current = tonumber(redis.call('GET', KEYS[1]) or '0')
    local requested = tonumber(ARGV[1])
    if current < requested then
        return 0
    end
    redis.call('DECRBY', KEYS[1], requested)
    return 1
"#;

/// Lua script for the all-or-nothing multi-lease acquisition.
///
/// KEYS    = lease keys (pre-sorted by the caller)
/// ARGV[1] = fencing token
/// ARGV[2] = lease duration in milliseconds
///
/// Either every key gets the token with a PX expiry, or none do.
const ACQUIRE_ALL_SCRIPT: &str = r#"
    for i, key in ipairs(KEYS) do
        if redis.call('EXISTS', key) == 1 then
            return 0
        end
    end
    for i, key in ipairs(KEYS) do
        redis.call('SET', key, ARGV[1], 'PX', ARGV[2])
    end
    return 1
"#;

/// Lua script releasing only leases still owned by the given token.
const RELEASE_OWNED_SCRIPT: &str = r#"
    local released = 0
    for i, key in ipairs(KEYS) do
        if redis.call('GET', key) == ARGV[1] then
            released = released + redis.call('DEL', key)
        end
    end
    return released
"#;

/// Lua script atomically popping the N lowest-score members of a sorted
/// set and adding them to a plain set.
///
/// KEYS[1] = source sorted set, KEYS[2] = destination set
/// ARGV[1] = maximum members to move
const POP_MIN_INTO_SET_SCRIPT: &str = r#"
    local popped = redis.call('ZPOPMIN', KEYS[1], tonumber(ARGV[1]))
    local members = {}
    for i = 1, #popped, 2 do
        table.insert(members, popped[i])
        redis.call('SADD', KEYS[2], popped[i])
    end
    return members
"#;

/// Redis-backed [`CoordinationStore`].
#[derive(Debug, Clone)]
pub struct RedisStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisStore {
    /// Create a new Redis coordination store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(
            boxoffice_core::error::ErrorKind::Coordination,
            format!("Redis error: {e}"),
            e,
        )
    }
}

#[async_trait]
impl CoordinationStore for RedisStore {
    async fn counter_get(&self, key: &str) -> AppResult<Option<i64>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<i64> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn counter_init(&self, key: &str, value: i64) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        // SET key value NX
        let result: Option<String> = redis::cmd("SET")
            .arg(&full_key)
            .arg(value)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result.is_some())
    }

    async fn counter_set(&self, key: &str, value: i64) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.set(&full_key, value).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn try_decrement(&self, key: &str, by: i64) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        let result: i64 = redis::Script::new(DECREMENT_IF_ENOUGH_SCRIPT)
            .key(&full_key)
            .arg(by)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result == 1)
    }

    async fn increment(&self, key: &str, by: i64) -> AppResult<i64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: i64 = conn.incr(&full_key, by).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let removed: i64 = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(removed > 0)
    }

    async fn acquire_leases(
        &self,
        keys: &[String],
        wait: Duration,
        lease: Duration,
    ) -> AppResult<Option<String>> {
        // Sorting the keys keeps overlapping acquisitions deadlock-free.
        let mut sorted: Vec<String> = keys.iter().map(|k| self.client.prefixed_key(k)).collect();
        sorted.sort();

        let token = Uuid::new_v4().to_string();
        let deadline = Instant::now() + wait;
        let mut conn = self.client.conn_mut();

        loop {
            let script = redis::Script::new(ACQUIRE_ALL_SCRIPT);
            let mut invocation = script.prepare_invoke();
            for key in &sorted {
                invocation.key(key.as_str());
            }
            invocation.arg(&token).arg(lease.as_millis() as u64);

            let acquired: i64 = invocation
                .invoke_async(&mut conn)
                .await
                .map_err(Self::map_err)?;

            if acquired == 1 {
                return Ok(Some(token));
            }
            if Instant::now() + LEASE_RETRY_INTERVAL > deadline {
                return Ok(None);
            }
            tokio::time::sleep(LEASE_RETRY_INTERVAL).await;
        }
    }

    async fn release_leases(&self, keys: &[String], token: &str) -> AppResult<()> {
        let mut conn = self.client.conn_mut();

        let script = redis::Script::new(RELEASE_OWNED_SCRIPT);
        let mut invocation = script.prepare_invoke();
        for key in keys {
            invocation.key(self.client.prefixed_key(key));
        }
        invocation.arg(token);

        let _: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_marker(&self, key: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .pset_ex(&full_key, "1", ttl.as_millis() as u64)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn remove_marker(&self, key: &str) -> AppResult<bool> {
        self.delete(key).await
    }

    async fn subscribe_expired(&self) -> AppResult<mpsc::Receiver<String>> {
        spawn_expiry_listener(&self.client).await
    }

    async fn zset_add(&self, key: &str, member: &str, score: f64) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .zadd(&full_key, member, score)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn zset_rank(&self, key: &str, member: &str) -> AppResult<Option<u64>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let rank: Option<u64> = conn.zrank(&full_key, member).await.map_err(Self::map_err)?;
        Ok(rank)
    }

    async fn pop_min_into_set(
        &self,
        from: &str,
        into: &str,
        count: u64,
    ) -> AppResult<Vec<String>> {
        let mut conn = self.client.conn_mut();

        let members: Vec<String> = redis::Script::new(POP_MIN_INTO_SET_SCRIPT)
            .key(self.client.prefixed_key(from))
            .key(self.client.prefixed_key(into))
            .arg(count)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(members)
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.sadd(&full_key, member).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: bool = conn
            .sismember(&full_key, member)
            .await
            .map_err(Self::map_err)?;
        Ok(result)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: bool = conn
            .pexpire(&full_key, ttl.as_millis() as i64)
            .await
            .map_err(Self::map_err)?;
        Ok(result)
    }

    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let full_pattern = self.client.prefixed_key(pattern);
        let mut conn = self.client.conn_mut();

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&full_pattern)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        let prefix = self.client.prefix();
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(prefix).map(str::to_string))
            .collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
