use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub api_url: String,
    pub api_key: String,
    pub lang: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub weather: WeatherConfig,
    pub default_lat: Option<f64>,
    pub default_lon: Option<f64>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let weather = WeatherConfig {
            api_url: std::env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1".into()),
            api_key: std::env::var("WEATHER_API_KEY")?,
            lang: std::env::var("WEATHER_LANG").unwrap_or_else(|_| "es".into()),
        };
        // Sin coordenadas configuradas el proveedor de ubicación responde "denegado".
        let default_lat = std::env::var("DEFAULT_LAT")
            .ok()
            .and_then(|v| v.parse::<f64>().ok());
        let default_lon = std::env::var("DEFAULT_LON")
            .ok()
            .and_then(|v| v.parse::<f64>().ok());
        Ok(Self {
            database_url,
            weather,
            default_lat,
            default_lon,
        })
    }
}
