mod loader;

pub use loader::{Settings, get_default_config, load_configuration, write_config_to};
