pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,
        /// Directory holding the browser scripts and stylesheets.
        #[serde(default = "default_static_dir")]
        pub static_dir: String,
        /// Whether the store starts with the sample week of tasks.
        #[serde(default = "default_seed_tasks")]
        pub seed_tasks: bool,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_environment(config::Environment::default())
        }

        fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(environment.try_parsing(true))
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                port: default_port(),
                static_dir: default_static_dir(),
                seed_tasks: default_seed_tasks(),
            }
        }
    }

    fn default_port() -> u16 {
        3000
    }

    fn default_static_dir() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string()
    }

    fn default_seed_tasks() -> bool {
        true
    }

}
pub mod task;
pub mod web;
