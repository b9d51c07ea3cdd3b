use crate::config::AppConfig;
use crate::location::{ConfigLocation, LocationProvider};
use crate::storage::{KvStore, PgKvStore};
use crate::weather::{HttpWeatherClient, WeatherClient};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub weather: Arc<dyn WeatherClient>,
    pub location: Arc<dyn LocationProvider>,
    pub kv: Arc<dyn KvStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        let weather = Arc::new(HttpWeatherClient::new(&config.weather));
        let location = Arc::new(ConfigLocation::new(&config));
        let kv = Arc::new(PgKvStore::new(db.clone()));

        Ok(Self {
            db,
            weather,
            location,
            kv,
        })
    }
}
