use log::warn;
use std::env;

//LONG: Move into a nice TOML (or other) file.

pub struct Config {
    pub database_url: String,
    pub db_pool_size: u32,
}

impl Config {
    /// Read configuration from the environment. Only the database URL is
    /// mandatory; everything else falls back with a logged warning.
    pub fn from_env() -> Result<Config, &'static str> {
        let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL unspecified")?;

        let db_pool_size = env::var("DB_POOL_SIZE")
            .map_err(|_| "unspecified")
            .and_then(|n| {
                match n.parse() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err("invalid"),
                }
            })
            .unwrap_or_else(|e| {
                warn!("DB_POOL_SIZE {}, defaulting to 10.", e);
                10
            });

        Ok(Config {
            database_url,
            db_pool_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Serial by nature: tests mutate process-wide environment variables, so
    // everything lives in one test.
    #[test]
    fn from_env_reads_and_defaults() {
        env::remove_var("DATABASE_URL");
        assert!(Config::from_env().is_err());

        env::set_var("DATABASE_URL", "postgres://localhost/acdmc");
        env::set_var("DB_POOL_SIZE", "not-a-number");
        let config = Config::from_env().unwrap();
        assert_eq!(config.database_url, "postgres://localhost/acdmc");
        assert_eq!(config.db_pool_size, 10);

        env::set_var("DB_POOL_SIZE", "4");
        assert_eq!(Config::from_env().unwrap().db_pool_size, 4);

        env::remove_var("DATABASE_URL");
        env::remove_var("DB_POOL_SIZE");
    }
}
