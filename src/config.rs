use figment::{
    providers::{Env, Format, Json, Toml, YamlExtended},
    Figment,
};
use rocket::{
    config::Ident,
    data::{ByteUnit, Limits},
    Config,
};
use serde::{Deserialize, Serialize};
use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

/// Slack added on top of the batch size so that multipart headers and
/// boundaries of a full batch still fit into the `data-form` limit.
const DATA_FORM_OVERHEAD: u64 = 1024 * 1024;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// The address to bind the server to.
    pub address: Option<IpAddr>,
    /// The port to bind the server to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The directory every uploaded file is stored in.
    #[serde(default = "default_file_base_path")]
    pub file_base_path: PathBuf,
    /// The directory multipart parts are streamed into before they are stored.
    #[serde(default = "std::env::temp_dir")]
    pub temp_base_path: PathBuf,
    /// The maximum size of a single uploaded file.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: ByteUnit,
    /// The maximum number of files accepted by a batch upload.
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,
    /// Overrides for the remaining rocket limits.
    pub limits: Option<AppLimit>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AppLimit {
    pub form: Option<ByteUnit>,
    pub data_form: Option<ByteUnit>,
    pub string: Option<ByteUnit>,
    pub json: Option<ByteUnit>,
}

fn default_port() -> u16 {
    3000
}

fn default_file_base_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> ByteUnit {
    ByteUnit::Mebibyte(100)
}

fn default_max_batch_files() -> usize {
    10
}

impl AppConfig {
    pub fn load(file_path: Option<impl AsRef<Path>>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new().join(Env::raw());

        if let Some(file_path) = file_path {
            let file_path = file_path.as_ref();

            if !file_path.exists() {
                return Err(
                    format!("The given path `{}` is not exist.", file_path.display()).into(),
                );
            }

            match file_path.extension() {
                Some(ext) if ext.eq_ignore_ascii_case("json") => {
                    figment = figment.join(Json::file(file_path));
                }
                Some(ext)
                    if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") =>
                {
                    figment = figment.join(YamlExtended::file(file_path));
                }
                _ => {
                    figment = figment.join(Toml::file(file_path));
                }
            }
        }

        figment.extract()
    }

    /// The `data-form` limit, large enough to carry a full batch of maximum-sized files.
    pub fn data_form_limit(&self) -> ByteUnit {
        if let Some(data_form) = self.limits.as_ref().and_then(|limits| limits.data_form) {
            return data_form;
        }

        let batch = self
            .max_file_size
            .as_u64()
            .saturating_mul(self.max_batch_files.max(1) as u64);
        ByteUnit::from(batch.saturating_add(DATA_FORM_OVERHEAD))
    }

    pub fn make_rocket_config(&self) -> Config {
        let mut config = Config::default();

        if let Some(address) = self.address {
            config.address = address;
        }

        config.port = self.port;
        config.temp_dir = self.temp_base_path.clone().into();

        let mut limits = Limits::default()
            .limit("file", self.max_file_size)
            .limit("data-form", self.data_form_limit());

        if let Some(app_limits) = &self.limits {
            if let Some(form) = app_limits.form {
                limits = limits.limit("form", form);
            }
            if let Some(string) = app_limits.string {
                limits = limits.limit("string", string);
            }
            if let Some(json) = app_limits.json {
                limits = limits.limit("json", json);
            }
        }

        config.limits = limits;
        config.ident = Ident::none();
        config.keep_alive = 60;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from_toml(toml: &str) -> AppConfig {
        Figment::new().join(Toml::string(toml)).extract().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from_toml("");

        assert_eq!(config.port, 3000);
        assert_eq!(config.file_base_path, PathBuf::from("uploads"));
        assert_eq!(config.max_file_size, ByteUnit::Mebibyte(100));
        assert_eq!(config.max_batch_files, 10);
    }

    #[test]
    fn test_rocket_limits_follow_max_file_size() {
        let config = config_from_toml(
            r#"
            port = 8080
            max_file_size = "2 MiB"
            max_batch_files = 3
            "#,
        );
        let rocket_config = config.make_rocket_config();

        assert_eq!(rocket_config.port, 8080);
        assert_eq!(
            rocket_config.limits.get("file"),
            Some(ByteUnit::Mebibyte(2))
        );
        assert_eq!(
            rocket_config.limits.get("data-form"),
            Some(ByteUnit::Mebibyte(7))
        );
    }

    #[test]
    fn test_explicit_data_form_limit_wins() {
        let config = config_from_toml(
            r#"
            [limits]
            data_form = "5 MiB"
            "#,
        );

        assert_eq!(config.data_form_limit(), ByteUnit::Mebibyte(5));
    }
}
