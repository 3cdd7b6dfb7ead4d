use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// City used when the user has not picked one yet
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default = "default_cities")]
    pub cities: Vec<CityConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CityConfig {
    pub name: String,
    pub country: String,
    /// Search term sent to the news API
    pub query: String,
}

fn default_city() -> String {
    "New York".to_string()
}

fn default_database_url() -> String {
    "sqlite:city_pulse.db?mode=rwc".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_base_url() -> String {
    "https://newsdata.io/api/1".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_cities() -> Vec<CityConfig> {
    [
        ("New York", "USA"),
        ("Los Angeles", "USA"),
        ("Chicago", "USA"),
        ("Houston", "USA"),
        ("Miami", "USA"),
        ("San Francisco", "USA"),
        ("Seattle", "USA"),
        ("Boston", "USA"),
        ("London", "UK"),
        ("Paris", "France"),
        ("Tokyo", "Japan"),
        ("Sydney", "Australia"),
        ("Mumbai", "India"),
        ("Delhi", "India"),
        ("Bangalore", "India"),
        ("Toronto", "Canada"),
        ("Berlin", "Germany"),
        ("Singapore", "Singapore"),
        ("Dubai", "UAE"),
        ("Hong Kong", "China"),
    ]
    .into_iter()
    .map(|(name, country)| CityConfig {
        name: name.to_string(),
        country: country.to_string(),
        query: name.to_string(),
    })
    .collect()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `DATABASE_URL` and `NEWSDATA_API_KEY` overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(key) = std::env::var("NEWSDATA_API_KEY") {
            self.news.api_key = key;
        }
    }

    pub fn find_city(&self, name: &str) -> Option<&CityConfig> {
        self.cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Search term for a city name; unknown names are searched verbatim.
    pub fn query_for(&self, city: &str) -> String {
        self.find_city(city)
            .map(|c| c.query.clone())
            .unwrap_or_else(|| city.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_config() {
        let config = Config::from_str("").unwrap();

        assert_eq!(config.default_city, "New York");
        assert_eq!(config.database_url, "sqlite:city_pulse.db?mode=rwc");
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.news.base_url, "https://newsdata.io/api/1");
        assert_eq!(config.news.language, "en");
        assert!(config.news.api_key.is_empty());
        assert_eq!(config.cities.len(), 20);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            default_city = "London"
            database_url = "sqlite::memory:"

            [news]
            api_key = "secret"
            language = "fr"

            [[cities]]
            name = "London"
            country = "UK"
            query = "London"

            [[cities]]
            name = "Paris"
            country = "France"
            query = "Paris France"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.default_city, "London");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.news.api_key, "secret");
        assert_eq!(config.news.language, "fr");
        assert_eq!(config.news.base_url, "https://newsdata.io/api/1");
        assert_eq!(config.cities.len(), 2);
        assert_eq!(config.cities[1].query, "Paris France");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/city_pulse.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let result = Config::from_str("this is not valid toml {{{");
        assert!(result.is_err());
    }

    #[test]
    fn test_city_missing_required_fields() {
        let content = r#"
            [[cities]]
            name = "Tokyo"
            # Missing country and query
        "#;

        assert!(Config::from_str(content).is_err());
    }

    #[test]
    fn test_empty_city_list() {
        let config = Config::from_str("cities = []").unwrap();
        assert!(config.cities.is_empty());
    }

    #[test]
    fn test_find_city_is_case_insensitive() {
        let config = Config::from_str("").unwrap();

        let city = config.find_city("  hong kong ").unwrap();
        assert_eq!(city.country, "China");
        assert!(config.find_city("Atlantis").is_none());
    }

    #[test]
    fn test_query_for_unknown_city_is_verbatim() {
        let content = r#"
            [[cities]]
            name = "Paris"
            country = "France"
            query = "Paris France"
        "#;
        let config = Config::from_str(content).unwrap();

        assert_eq!(config.query_for("paris"), "Paris France");
        assert_eq!(config.query_for("Springfield"), "Springfield");
    }
}
